use leptos::prelude::*;
use pulldown_cmark::{html, Options, Parser};

/// Render note markdown (GFM flavour) to HTML.
pub(crate) fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

#[component]
pub fn MarkdownView(#[prop(into)] content: Signal<String>) -> impl IntoView {
    let html = Memo::new(move |_| content.with(|c| render_markdown(c)));

    view! {
        <div class="prose prose-sm dark:prose-invert max-w-none" inner_html=move || html.get() />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_gfm_tables_and_tasks() {
        let out = render_markdown("|a|b|\n|---|---|\n|1|2|\n\n- [x] done\n");
        assert!(out.contains("<table>"));
        assert!(out.contains("<td>1</td>"));
        assert!(out.contains("checkbox"));
    }
}
