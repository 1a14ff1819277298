use dioxus::prelude::*;
use superteach_core::PageState;

use super::balance::BalanceCard;
use super::connection_status::{ConnectButton, ConnectionStatusIndicator, DisconnectButton};
use super::ipfs_upload::IpfsUploadForm;
use super::send_sol::SendSolForm;
use crate::state::SharedStarter;

#[component]
pub fn TopBar() -> Element {
    let page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let cluster = starter.config().cluster;
    let address = page.read().address().map(truncate_pubkey);

    rsx! {
        header { class: "topbar",
            div { class: "topbar-left",
                span { class: "brand-icon", "◈" }
                span { class: "brand-text", "Superteach Starter" }
                if let Some(address) = address {
                    div { class: "topbar-divider" }
                    span { class: "mono", "{address}" }
                }
            }
            div { class: "topbar-right",
                span { class: "cluster-badge", "{cluster}" }
                ConnectionStatusIndicator {}
            }
        }
    }
}

/// The whole page body: connect prompt, or the wallet panel once a
/// session exists.
#[component]
pub fn HomePage() -> Element {
    let page = use_context::<Signal<PageState>>();
    let address = page.read().address().map(str::to_string);

    rsx! {
        div { class: "page",
            h1 { "Superteach Starter" }

            if let Some(address) = address {
                div { class: "wallet-panel",
                    h2 { class: "label", "Your wallet address is " span { class: "mono", "{address}" } }
                    BalanceCard {}
                    section { class: "section",
                        h4 { class: "section-title", "Send SOL" }
                        SendSolForm {}
                    }
                    section { class: "section",
                        h4 { class: "section-title", "Upload to IPFS" }
                        IpfsUploadForm {}
                    }
                    DisconnectButton {}
                }
            } else {
                div { class: "connect-nudge",
                    p { class: "empty-desc",
                        "Connect a wallet to check your balance, send SOL and upload files to IPFS."
                    }
                    ConnectButton {}
                }
            }
        }
    }
}

fn truncate_pubkey(pubkey: &str) -> String {
    if pubkey.len() > 12 {
        format!("{}...{}", &pubkey[..6], &pubkey[pubkey.len() - 4..])
    } else {
        pubkey.to_string()
    }
}
