use dioxus::prelude::*;
use superteach_core::PageState;

use super::toaster::notify;
use crate::state::{SharedStarter, Toasts};

#[component]
pub fn IpfsUploadForm() -> Element {
    let mut page = use_context::<Signal<PageState>>();
    let starter = use_context::<SharedStarter>();
    let toasts = use_context::<Signal<Toasts>>();

    let mut source_url = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let on_upload = move |_| {
        let url = source_url.read().clone();
        let starter = starter.clone();

        page.write().begin_upload();
        busy.set(true);
        spawn(async move {
            let result = starter.upload_from_url(&url).await;
            busy.set(false);

            let notice = page.write().apply_upload(result);
            if let Some(notice) = notice {
                notify(toasts, notice);
            }
        });
    };

    let status_text = page.read().status_text.clone();
    let upload_url = page.read().upload_url.clone();

    rsx! {
        div { class: "form-grid",
            div { class: "form-group",
                label { "File URL" }
                input {
                    class: "input input-wide",
                    r#type: "text",
                    placeholder: "https://example.com/image.png",
                    value: "{source_url}",
                    oninput: move |e| source_url.set(e.value()),
                }
            }

            button {
                class: "btn btn-upload",
                disabled: *busy.read(),
                onclick: on_upload,
                if *busy.read() { "Uploading..." } else { "Upload to IPFS 🌌" }
            }

            if !status_text.is_empty() {
                h3 { class: "status-text", "{status_text}" }
            }
            if let Some(url) = upload_url {
                a { class: "explorer-link mono", href: "{url}", target: "_blank", "{url}" }
            }
        }
    }
}
