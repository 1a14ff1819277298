use dioxus::prelude::*;
use superteach_core::PageState;

use super::toaster::notify;
use crate::state::{SharedStarter, Toasts};

/// Re-read the connected account's balance into the page.
pub async fn refresh_balance(mut page: Signal<PageState>, starter: SharedStarter, toasts: Signal<Toasts>) {
    let Some(address) = page.read().address().map(str::to_string) else {
        return;
    };
    let result = starter.get_balance(&address).await;
    let notice = page.write().apply_balance(result);
    if let Some(notice) = notice {
        notify(toasts, notice);
    }
}

#[component]
pub fn BalanceCard() -> Element {
    let page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let toasts = use_context::<Signal<Toasts>>();
    let mut busy = use_signal(|| false);

    let on_refresh = move |_| {
        let starter = starter.clone();
        busy.set(true);
        spawn(async move {
            refresh_balance(page, starter, toasts).await;
            busy.set(false);
        });
    };

    let balance = page.read().balance_display();

    rsx! {
        div { class: "result-card",
            h3 { class: "balance-large", "Your balance is {balance} SOL" }
            button {
                class: "btn btn-secondary",
                disabled: *busy.read(),
                onclick: on_refresh,
                if *busy.read() { "Fetching..." } else { "Refresh" }
            }
        }
    }
}
