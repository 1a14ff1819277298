use std::time::Duration;

use dioxus::prelude::*;
use superteach_core::Notice;

use crate::state::Toasts;

const TOAST_TTL: Duration = Duration::from_secs(4);

/// Show `notice` and drop it again after a few seconds.
pub fn notify(mut toasts: Signal<Toasts>, notice: Notice) {
    let id = toasts.write().push(notice);
    spawn(async move {
        tokio::time::sleep(TOAST_TTL).await;
        toasts.write().dismiss(id);
    });
}

#[component]
pub fn Toaster() -> Element {
    let mut toasts = use_context::<Signal<Toasts>>();
    let items = toasts.read().items.clone();

    rsx! {
        div { class: "toaster",
            for toast in items {
                div {
                    key: "{toast.id}",
                    class: if toast.notice.is_error() { "toast toast-error" } else { "toast toast-success" },
                    onclick: move |_| toasts.write().dismiss(toast.id),
                    span { class: "toast-icon", if toast.notice.is_error() { "✕" } else { "✓" } }
                    span { "{toast.notice.message}" }
                }
            }
        }
    }
}
