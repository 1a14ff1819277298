use std::sync::Arc;

use dioxus::prelude::*;
use superteach_core::{install_redirect, Launcher, PageState, WalletError};
use tracing::{debug, warn};

use super::balance::refresh_balance;
use super::toaster::notify;
use crate::state::{SharedStarter, Toasts};

/// Opens URLs through the webview, which hands `_blank` targets to the
/// system browser.
struct WebviewLauncher;

impl Launcher for WebviewLauncher {
    fn open(&self, url: &str) {
        let target = serde_json::to_string(url).unwrap_or_default();
        debug!(%url, "opening url from the webview");
        let eval = document::eval(&format!("window.open({target}, '_blank'); return null;"));
        let url = url.to_string();
        spawn(async move {
            if let Err(e) = eval.join::<serde_json::Value>().await {
                warn!(%url, error = ?e, "opening url failed");
            }
        });
    }
}

async fn redirect_to_install(starter: &SharedStarter) {
    let config = starter.config();
    install_redirect(
        Arc::new(WebviewLauncher),
        config.install_url.clone(),
        config.install_delay,
    )
    .await;
}

#[component]
pub fn ConnectionStatusIndicator() -> Element {
    let page = use_context::<Signal<PageState>>();
    let connected = page.read().session.is_some();

    rsx! {
        div { class: "conn-indicator",
            span { class: if connected { "dot connected" } else { "dot disconnected" } }
            span { class: "conn-label", if connected { "Connected" } else { "Disconnected" } }
        }
    }
}

#[component]
pub fn ConnectButton() -> Element {
    let mut page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let toasts = use_context::<Signal<Toasts>>();
    let mut busy = use_signal(|| false);

    let connect = move |_| {
        let starter = starter.clone();
        busy.set(true);
        spawn(async move {
            let result = starter.connect().await;
            busy.set(false);

            let unavailable = matches!(result, Err(WalletError::ProviderUnavailable));
            let notice = page.write().apply_connect(result);
            notify(toasts, notice);

            if unavailable {
                redirect_to_install(&starter).await;
            } else if page.read().session.is_some() {
                refresh_balance(page, starter, toasts).await;
            }
        });
    };

    rsx! {
        button {
            class: "btn btn-connect",
            disabled: *busy.read(),
            onclick: connect,
            if *busy.read() { "Connecting..." } else { "Connect your wallet 👻" }
        }
    }
}

#[component]
pub fn DisconnectButton() -> Element {
    let mut page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let toasts = use_context::<Signal<Toasts>>();

    let disconnect = move |_| {
        let starter = starter.clone();
        spawn(async move {
            let result = starter.disconnect().await;
            let unavailable = matches!(result, Err(WalletError::ProviderUnavailable));
            let notice = page.write().apply_disconnect(result);
            notify(toasts, notice);

            if unavailable {
                redirect_to_install(&starter).await;
            }
        });
    };

    rsx! {
        button { class: "btn btn-disconnect", onclick: disconnect, "Disconnect wallet 🛑" }
    }
}
