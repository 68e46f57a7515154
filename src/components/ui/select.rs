use leptos::prelude::*;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tw_merge::*;
use wasm_bindgen::JsCast;

/// Native `<select>` over every variant of a strum enum.
///
/// Option values are the variant's `Display` form, parsed back with `FromStr`.
#[component]
pub fn EnumSelect<T>(
    #[prop(into)] selected: Signal<T>,
    on_change: Callback<T>,
    label: fn(T) -> &'static str,
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] aria_label: String,
) -> impl IntoView
where
    T: IntoEnumIterator + FromStr + ToString + Copy + PartialEq + Send + Sync + 'static,
{
    let merged_class = tw_merge!(
        "h-8 w-full rounded-md border border-input bg-background px-2 text-xs outline-none focus-visible:ring-2 focus-visible:ring-ring/50",
        class
    );

    let on_select = move |ev: web_sys::Event| {
        let value = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            .map(|s| s.value());
        if let Some(choice) = value.and_then(|v| T::from_str(&v).ok()) {
            on_change.run(choice);
        }
    };

    view! {
        <select class=merged_class aria-label=aria_label on:change=on_select>
            {T::iter()
                .map(|choice| {
                    view! {
                        <option
                            value=choice.to_string()
                            selected=move || selected.get() == choice
                        >
                            {label(choice)}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}
