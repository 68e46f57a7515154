use crate::api::EnvConfig;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, FormError, Input, Label, ModalBody, ModalFooter, ModalFrame,
    Spinner,
};
use crate::models::{UpdateUser, UpdateUserPassword};
use crate::state::AppContext;
use crate::toast::ToastKind;
use leptos::prelude::*;
use leptos::task::spawn_local;

const FORBIDDEN: u16 = 403;

#[component]
pub(super) fn EditProfileModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let name = RwSignal::new(
        state
            .me
            .with_untracked(|m| m.as_ref().and_then(|u| u.name.clone()))
            .unwrap_or_default(),
    );
    let loading = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let trimmed = name.get_untracked().trim().to_string();
        let body = UpdateUser {
            name: (!trimmed.is_empty()).then_some(trimmed),
        };
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.update_users_me(&body).await {
                Ok(()) => {
                    state.refresh_me();
                    on_close.run(());
                }
                Err(e) => state.report(&e, "updating profile"),
            }
            loading.set(false);
        });
    };

    view! {
        <ModalFrame title="Update Profile" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="space-y-1">
                        <Label html_for="profile-name">"Full name"</Label>
                        <Input id="profile-name" bind_value=name placeholder="e.g. Leo Spratt" autofocus=true />
                    </div>
                    <ModalFooter>
                        <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                            "Cancel"
                        </Button>
                        <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Save"
                        </Button>
                    </ModalFooter>
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

#[component]
pub(super) fn ChangePasswordModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let existing = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let loading = RwSignal::new(false);

    let mismatch = Signal::derive(move || {
        let (n, c) = (new_password.get(), confirm.get());
        (!c.is_empty() && n != c).then(|| "Passwords do not match".to_string())
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() || mismatch.get_untracked().is_some() {
            return;
        }
        let body = UpdateUserPassword {
            existing_password: existing.get_untracked(),
            new_password: new_password.get_untracked(),
        };
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.update_users_me_password(&body).await {
                Ok(()) => {
                    state.notify(ToastKind::Success, "password updated");
                    on_close.run(());
                }
                Err(e) if e.status == FORBIDDEN => state.notify(
                    ToastKind::Error,
                    "existing password not accepted, did you type it correctly?",
                ),
                Err(e) => state.report(&e, "updating new password"),
            }
            loading.set(false);
        });
    };

    view! {
        <ModalFrame title="Update Password" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="space-y-1">
                        <Label html_for="pw-current">"Current password"</Label>
                        <Input
                            id="pw-current"
                            r#type="password"
                            bind_value=existing
                            placeholder="e.g. P@ssword123"
                            autocomplete="current-password"
                            required=true
                        />
                    </div>
                    <div class="space-y-1">
                        <Label html_for="pw-new">"New password"</Label>
                        <Input
                            id="pw-new"
                            r#type="password"
                            bind_value=new_password
                            placeholder="e.g. Qwerty@123"
                            autocomplete="new-password"
                            required=true
                        />
                    </div>
                    <div class="space-y-1">
                        <Label html_for="pw-confirm">"Confirm new password"</Label>
                        <Input
                            id="pw-confirm"
                            r#type="password"
                            bind_value=confirm
                            placeholder="e.g. Qwerty@123"
                            autocomplete="new-password"
                            required=true
                        />
                    </div>
                    <FormError error=mismatch />
                    <ModalFooter>
                        <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                            "Cancel"
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || loading.get() || mismatch.get().is_some()
                        >
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Save"
                        </Button>
                    </ModalFooter>
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

/// Point the app at a different backend.
#[component]
pub(super) fn ApiUrlModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let url = RwSignal::new(state.api_config.with_untracked(|c| c.api_server.clone()));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let api_server = url.get_untracked().trim().trim_end_matches('/').to_string();
        if api_server.is_empty() {
            return;
        }
        state.set_api_config(EnvConfig { api_server });
        state.load_server_info();
        on_close.run(());
    };

    let on_reset = move |_| {
        state.reset_api_config();
        state.load_server_info();
        on_close.run(());
    };

    view! {
        <ModalFrame title="Change Server" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <div class="space-y-1">
                        <Label html_for="api-url">"Server URL"</Label>
                        <Input
                            id="api-url"
                            r#type="url"
                            bind_value=url
                            placeholder="https://example.com"
                            required=true
                            autofocus=true
                        />
                    </div>
                    <ModalFooter>
                        <Button attr:r#type="button" variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_reset>
                            "Reset"
                        </Button>
                        <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                            "Cancel"
                        </Button>
                        <Button size=ButtonSize::Sm>"Set"</Button>
                    </ModalFooter>
                </ModalBody>
            </form>
        </ModalFrame>
    }
}
