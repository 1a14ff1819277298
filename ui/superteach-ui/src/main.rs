#![allow(non_snake_case)]

mod components;
mod state;

use std::sync::Arc;

use dioxus::prelude::*;
use superteach_core::{init_logging, AppConfig, PageState, Starter};

use components::balance::refresh_balance;
use state::{SharedStarter, Toasts};

const STYLE: &str = include_str!("../assets/style.css");

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);

    let starter: SharedStarter = Arc::new(Starter::from_config(config));

    dioxus::LaunchBuilder::new()
        .with_context(starter)
        .launch(App);
}

#[component]
fn App() -> Element {
    let starter = use_context::<SharedStarter>();
    let mut page = use_context_provider(|| Signal::new(PageState::default()));
    let toasts = use_context_provider(|| Signal::new(Toasts::default()));

    // Pick up the session persisted by a previous run
    use_hook(move || {
        spawn(async move {
            let restored = starter.restore_session();
            if page.write().apply_restore(restored) {
                refresh_balance(page, starter, toasts).await;
            }
        })
    });

    rsx! {
        document::Style { {STYLE} }
        div { class: "app-container",
            components::layout::TopBar {}
            div { class: "main-content",
                components::layout::HomePage {}
            }
            components::toaster::Toaster {}
        }
    }
}
