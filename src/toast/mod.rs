use crate::api::{ApiError, ApiErrorKind};
use icons::X;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// How long a toast stays up before dismissing itself.
pub(crate) const TOAST_TIMEOUT_MS: i32 = 6000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            Self::Info => "border-border bg-background text-foreground",
            Self::Success => "border-success/40 bg-success/10 text-foreground",
            Self::Warning => "border-warning/40 bg-warning/10 text-foreground",
            Self::Error => "border-destructive/40 bg-destructive/10 text-destructive",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

impl ApiError {
    /// Toast describing this failure while doing `context` (e.g. "saving note").
    pub fn into_toast(&self, context: &str) -> (ToastKind, String) {
        let kind = match self.kind {
            ApiErrorKind::Conflict | ApiErrorKind::NotFound => ToastKind::Warning,
            _ => ToastKind::Error,
        };
        (kind, self.describe(context))
    }
}

/// Ordered list of visible toasts; ids never repeat.
#[derive(Clone, Debug, Default)]
pub(crate) struct ToastQueue {
    items: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast { id, kind, message });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Shared handle to the toast queue, provided as context by the app shell.
#[derive(Clone, Copy)]
pub(crate) struct Toasts {
    queue: RwSignal<ToastQueue>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(ToastQueue::default()),
        }
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            ToastKind::Error => tracing::warn!("{message}"),
            _ => tracing::debug!("{message}"),
        }

        let Some(id) = self.queue.try_update(|q| q.push(kind, message)) else {
            return;
        };
        self.schedule_dismiss(id);
    }

    pub fn api_error(&self, e: &ApiError, context: &str) {
        let (kind, message) = e.into_toast(context);
        self.push(kind, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.try_update(|q| q.dismiss(id));
    }

    fn schedule_dismiss(&self, id: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };
        let toasts = *self;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || toasts.dismiss(id));
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_TIMEOUT_MS,
        );
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = expect_context::<Toasts>();
    let items = move || toasts.queue.with(|q| q.items().to_vec());

    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-[60] flex w-full max-w-sm flex-col gap-2">
            <For
                each=items
                key=|t| t.id
                children=move |toast: Toast| {
                    let id = toast.id;
                    view! {
                        <div
                            class=format!(
                                "pointer-events-auto flex items-start gap-2 rounded-md border px-3 py-2 text-sm shadow-md {}",
                                toast.kind.class(),
                            )
                            role="status"
                        >
                            <span class="flex-1">{toast.message}</span>
                            <button
                                type="button"
                                class="text-muted-foreground hover:text-foreground"
                                aria-label="Dismiss"
                                on:click=move |_| toasts.dismiss(id)
                            >
                                <X class="size-4" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dismiss_removes_only_that_toast() {
        let mut q = ToastQueue::default();
        let a = q.push(ToastKind::Info, "a".to_string());
        let b = q.push(ToastKind::Error, "b".to_string());
        q.dismiss(a);
        assert_eq!(q.items().len(), 1);
        assert_eq!(q.items()[0].id, b);

        let c = q.push(ToastKind::Success, "c".to_string());
        assert!(c > b);
    }

    #[test]
    fn api_errors_map_to_toast_kinds() {
        let conflict = ApiError::from_response(412, "");
        assert_eq!(conflict.into_toast("saving note").0, ToastKind::Warning);

        let server = ApiError::from_response(500, r#"{"title":"Internal Server Error"}"#);
        assert_eq!(
            server.into_toast("loading books"),
            (
                ToastKind::Error,
                "Internal Server Error while loading books".to_string()
            )
        );
    }
}
