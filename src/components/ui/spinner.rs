use icons::Loader;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <Loader class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Centered spinner for a region that is still fetching.
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex w-full justify-center py-6 text-muted-foreground">
            <Spinner class="size-5" />
        </div>
    }
}
