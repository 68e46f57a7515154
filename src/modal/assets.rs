use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Input, Label, Loading, ModalBody, ModalFooter, ModalFrame,
    Spinner,
};
use crate::models::{Note, NoteAsset};
use crate::state::AppContext;
use crate::toast::ToastKind;
use crate::util::{copy_to_clipboard, read_file_bytes};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "avif"];

fn looks_like_image(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Upload name: what the user typed, else the file's own name.
fn upload_name(typed: &str, file_name: &str) -> String {
    let typed = typed.trim();
    if typed.is_empty() {
        file_name.to_string()
    } else {
        typed.to_string()
    }
}

#[component]
pub(super) fn AssetsModal(note: Note, on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let note_id = StoredValue::new(note.id.clone());
    let allow_edit = state
        .current_book
        .with_untracked(|b| b.as_ref().is_some_and(|b| state.owns(b)));

    let assets: RwSignal<Vec<NoteAsset>> = RwSignal::new(vec![]);
    let loading = RwSignal::new(true);
    let modifying = RwSignal::new(false);
    let name = RwSignal::new(String::new());
    let file_ref = NodeRef::<html::Input>::new();

    let api = state.api();
    spawn_local(async move {
        match api.get_note_assets(&note_id.get_value()).await {
            Ok(found) => assets.set(found),
            Err(e) => state.report(&e, "loading assets"),
        }
        loading.set(false);
    });

    let on_upload = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if modifying.get_untracked() {
            return;
        }
        let Some(input) = file_ref.get_untracked() else {
            return;
        };
        let Some(file) = input.files().and_then(|f| f.item(0)) else {
            return;
        };
        let asset_name = upload_name(&name.get_untracked(), &file.name());
        let api = state.api();
        modifying.set(true);
        spawn_local(async move {
            let bytes = match read_file_bytes(&file).await {
                Ok(b) => b,
                Err(e) => {
                    state.notify(ToastKind::Error, e);
                    modifying.set(false);
                    return;
                }
            };
            match api
                .create_note_asset(&note_id.get_value(), &asset_name, bytes)
                .await
            {
                Ok(asset) => {
                    tracing::info!(asset = %asset.id, "asset uploaded");
                    assets.update(|a| a.push(asset));
                    input.set_value("");
                    name.set(String::new());
                }
                Err(e) => state.report(&e, "uploading asset"),
            }
            modifying.set(false);
        });
    };

    let on_delete = move |asset_id: String| {
        let api = state.api();
        modifying.set(true);
        spawn_local(async move {
            match api.delete_note_asset(&note_id.get_value(), &asset_id).await {
                Ok(()) => assets.update(|a| a.retain(|x| x.id != asset_id)),
                Err(e) => state.report(&e, "deleting asset"),
            }
            modifying.set(false);
        });
    };

    let on_copy = move |url: String| {
        spawn_local(async move {
            match copy_to_clipboard(&url).await {
                Ok(()) => state.notify(ToastKind::Success, "copied to clipboard"),
                Err(e) => state.notify(ToastKind::Error, e),
            }
        });
    };

    view! {
        <ModalFrame title="Note Assets" on_close=on_close class="max-w-lg">
            <ModalBody>
                <Show when=move || allow_edit fallback=|| ().into_view()>
                    <form class="space-y-2 rounded-md border p-2" on:submit=on_upload>
                        <div class="text-xs font-medium">"New asset"</div>
                        <input
                            type="file"
                            required=true
                            class="block w-full text-xs"
                            node_ref=file_ref
                            on:change=move |_| name.set(String::new())
                        />
                        <div class="space-y-1">
                            <Label html_for="asset-name">"Name"</Label>
                            <Input id="asset-name" bind_value=name placeholder="e.g. my cat" />
                        </div>
                        <Button size=ButtonSize::Sm attr:disabled=move || modifying.get()>
                            <Show when=move || modifying.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Upload"
                        </Button>
                    </form>
                </Show>
                <div class="text-xs font-medium">"Existing assets"</div>
                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <ul class="max-h-48 space-y-1 overflow-y-auto">
                        <For
                            each=move || assets.get()
                            key=|a| a.id.clone()
                            children=move |asset: NoteAsset| {
                                let url = state.api().asset_url(&asset.note_id, &asset.id);
                                let (copy_url, open_url) = (url.clone(), url.clone());
                                let preview = looks_like_image(&asset.name)
                                    .then(|| view! { <img class="size-10 rounded object-cover" src=url alt=asset.name.clone() /> });
                                let id = asset.id.clone();
                                view! {
                                    <li class="flex items-center gap-2 rounded-md border px-2 py-1 text-xs">
                                        {preview}
                                        <span class="flex-1 truncate">{asset.name.clone()}</span>
                                        <Button
                                            variant=ButtonVariant::Outline
                                            size=ButtonSize::Sm
                                            attr:title=format!("Copy link \"{}\"", asset.name)
                                            on:click=move |_| on_copy(copy_url.clone())
                                        >
                                            "Link"
                                        </Button>
                                        <a
                                            class="text-primary underline underline-offset-4"
                                            href=open_url
                                            target="_blank"
                                            rel="noopener"
                                        >
                                            "Open"
                                        </a>
                                        <Show when=move || allow_edit fallback=|| ().into_view()>
                                            {
                                                let id = id.clone();
                                                view! {
                                                    <Button
                                                        variant=ButtonVariant::Destructive
                                                        size=ButtonSize::Sm
                                                        attr:disabled=move || modifying.get()
                                                        on:click=move |_| on_delete(id.clone())
                                                    >
                                                        "Delete"
                                                    </Button>
                                                }
                                            }
                                        </Show>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
                <ModalFooter>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                        "Close"
                    </Button>
                </ModalFooter>
            </ModalBody>
        </ModalFrame>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_detection_uses_extension() {
        assert!(looks_like_image("cat.PNG"));
        assert!(looks_like_image("diagram.svg"));
        assert!(!looks_like_image("notes.pdf"));
        assert!(!looks_like_image("png"));
    }

    #[test]
    fn empty_name_falls_back_to_file_name() {
        assert_eq!(upload_name("  ", "cat.png"), "cat.png");
        assert_eq!(upload_name("my cat", "cat.png"), "my cat");
    }
}
