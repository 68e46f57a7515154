use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Input, Label, ModalBody, ModalFooter, ModalFrame,
};
use crate::editor::{image_markdown, link_markdown, table_markdown};
use leptos::prelude::*;

const MAX_TABLE_SIZE: usize = 64;

/// Parse a table dimension, clamped to something an editor can hold.
fn parse_dimension(v: &str) -> Option<usize> {
    v.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_TABLE_SIZE))
}

#[component]
fn InsertFooter(on_close: Callback<()>) -> impl IntoView {
    view! {
        <ModalFooter>
            <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                "Cancel"
            </Button>
            <Button size=ButtonSize::Sm>"Insert"</Button>
        </ModalFooter>
    }
}

#[component]
pub(super) fn InsertLinkModal(on_insert: Callback<String>, on_close: Callback<()>) -> impl IntoView {
    let title = RwSignal::new(String::new());
    let url = RwSignal::new(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let url = url.get_untracked();
        let title = title.get_untracked();
        let title = if title.trim().is_empty() { url.clone() } else { title };
        on_insert.run(link_markdown(&title, &url));
        on_close.run(());
    };

    view! {
        <ModalFrame title="Insert Link" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="space-y-1">
                        <Label html_for="link-title">"Title"</Label>
                        <Input id="link-title" bind_value=title placeholder="e.g. Note Mark" autofocus=true />
                    </div>
                    <div class="space-y-1">
                        <Label html_for="link-url">"Link"</Label>
                        <Input id="link-url" bind_value=url placeholder="e.g. https://example.com" required=true />
                    </div>
                    <InsertFooter on_close=on_close />
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

#[component]
pub(super) fn InsertImageModal(on_insert: Callback<String>, on_close: Callback<()>) -> impl IntoView {
    let alt = RwSignal::new(String::new());
    let src = RwSignal::new(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        on_insert.run(image_markdown(alt.get_untracked().trim(), &src.get_untracked()));
        on_close.run(());
    };

    view! {
        <ModalFrame title="Insert Image" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="space-y-1">
                        <Label html_for="image-alt">"Alt text"</Label>
                        <Input id="image-alt" bind_value=alt placeholder="e.g. my cat" autofocus=true />
                    </div>
                    <div class="space-y-1">
                        <Label html_for="image-src">"Source"</Label>
                        <Input id="image-src" bind_value=src placeholder="e.g. https://example.com/cat.png" required=true />
                    </div>
                    <InsertFooter on_close=on_close />
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

#[component]
pub(super) fn InsertTableModal(on_insert: Callback<String>, on_close: Callback<()>) -> impl IntoView {
    let rows = RwSignal::new("2".to_string());
    let columns = RwSignal::new("2".to_string());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (Some(r), Some(c)) = (
            parse_dimension(&rows.get_untracked()),
            parse_dimension(&columns.get_untracked()),
        ) else {
            return;
        };
        on_insert.run(table_markdown(r, c));
        on_close.run(());
    };

    view! {
        <ModalFrame title="Insert Table" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="grid grid-cols-2 gap-2">
                        <div class="space-y-1">
                            <Label html_for="table-rows">"Rows"</Label>
                            <Input id="table-rows" r#type="number" bind_value=rows required=true autofocus=true />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="table-columns">"Columns"</Label>
                            <Input id="table-columns" r#type="number" bind_value=columns required=true />
                        </div>
                    </div>
                    <InsertFooter on_close=on_close />
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

#[cfg(test)]
mod tests {
    use super::parse_dimension;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_dimensions_are_positive_and_capped() {
        assert_eq!(parse_dimension(" 3 "), Some(3));
        assert_eq!(parse_dimension("0"), None);
        assert_eq!(parse_dimension("-1"), None);
        assert_eq!(parse_dimension("1000"), Some(64));
    }
}
