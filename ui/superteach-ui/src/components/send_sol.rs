use dioxus::prelude::*;
use superteach_core::PageState;

use super::toaster::notify;
use crate::state::{SharedStarter, Toasts};

#[component]
pub fn SendSolForm() -> Element {
    let mut page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let toasts = use_context::<Signal<Toasts>>();

    let mut amount_str = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let on_send = move |_| {
        let Some(owner) = page.read().address().map(str::to_string) else {
            return;
        };
        let request = page.read().transfer_request();
        let last_known = page.read().balance;
        let starter = starter.clone();

        busy.set(true);
        spawn(async move {
            let outcome = starter.send_transaction(&owner, &request, last_known).await;
            busy.set(false);

            let sent = outcome.is_ok();
            let notices = page.write().apply_transfer(outcome);
            for notice in notices {
                notify(toasts, notice);
            }
            if sent {
                amount_str.set(String::new());
            }
        });
    };

    let destination = page.read().destination.clone();
    let explorer_link = page.read().explorer_link.clone();

    rsx! {
        div { class: "form-grid",
            div { class: "form-group",
                label { "Destination wallet" }
                input {
                    class: "input input-wide",
                    r#type: "text",
                    placeholder: "Enter the destination wallet address",
                    value: "{destination}",
                    oninput: move |e| page.write().destination = e.value(),
                }
            }

            div { class: "form-group",
                label { "Amount of SOL to send" }
                input {
                    class: "input",
                    r#type: "number",
                    placeholder: "Enter the amount of SOL to send",
                    value: "{amount_str}",
                    oninput: move |e| {
                        page.write().amount = parse_amount(&e.value());
                        amount_str.set(e.value());
                    },
                }
            }

            button {
                class: "btn btn-primary",
                disabled: *busy.read(),
                onclick: on_send,
                if *busy.read() { "Sending..." } else { "Send ⚡" }
            }

            if let Some(link) = explorer_link {
                a { class: "explorer-link", href: "{link}", target: "_blank",
                    "View transaction on Solana Explorer 🚀"
                }
            }
        }
    }
}

/// Amount typed into the form, in SOL. Anything unparseable counts as 0.
fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
