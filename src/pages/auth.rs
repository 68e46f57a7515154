use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, FormError, Input, Label, Spinner,
};
use crate::models::CreateUser;
use crate::modal::ModalKind;
use crate::state::AppContext;
use crate::toast::ToastKind;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

const FORBIDDEN: u16 = 403;
const USERNAME_PATTERN: &str = "[A-Za-z0-9]{3,30}";

#[component]
fn AuthShell(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Note Mark"</a>
                </div>
                {children()}
            </div>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let loading = RwSignal::new(false);

    Effect::new(move |_| {
        if state.is_authenticated() {
            navigate.with_value(|nav| nav("/", Default::default()));
        }
    });

    let server_missing = move || state.server_info.with(Option::is_none);
    let login_allowed = move || {
        state
            .server_info
            .with(|i| i.as_ref().is_some_and(|i| i.allow_internal_login))
    };
    let signup_allowed = move || {
        state
            .server_info
            .with(|i| i.as_ref().is_some_and(|i| i.allow_internal_signup))
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let (user, pass) = (username.get_untracked(), password.get_untracked());
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.post_token(&user, &pass).await {
                Ok(token) => {
                    tracing::debug!(expires_in = token.expires_in, "login flow success");
                    state.login(&token);
                    navigate.with_value(|nav| nav("/", Default::default()));
                }
                Err(e) => {
                    state.report(&e, "logging-in");
                    password.set(String::new());
                }
            }
            loading.set(false);
        });
    };

    view! {
        <AuthShell>
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Login"</CardTitle>
                    <CardDescription class="text-xs">
                        {move || state.api_config.with(|c| c.api_server.clone())}
                    </CardDescription>
                </CardHeader>
                <CardContent class="flex flex-col gap-3">
                    <Show when=server_missing fallback=|| ().into_view()>
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">
                                "No server available to handle requests!"
                            </AlertDescription>
                        </Alert>
                    </Show>
                    <Show
                        when=login_allowed
                        fallback=move || view! {
                            <Show when=move || !server_missing() fallback=|| ().into_view()>
                                <p class="text-xs text-muted-foreground">"This server does not accept password logins."</p>
                            </Show>
                        }
                    >
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="username" class="text-xs">"Username"</Label>
                                <Input
                                    id="username"
                                    placeholder="Username"
                                    autocomplete="username"
                                    bind_value=username
                                    required=true
                                    autofocus=true
                                />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="Password"
                                    autocomplete="current-password"
                                    bind_value=password
                                    required=true
                                />
                            </div>
                            <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Logging in..." } else { "Login" }}
                                </span>
                            </Button>
                        </form>
                    </Show>
                    <div class="flex items-center justify-between pt-1 text-xs text-muted-foreground">
                        <Show when=signup_allowed fallback=|| view! { <span /> }>
                            <span>
                                "No account? "
                                <a class="text-primary underline underline-offset-4" href="/signup">"Sign up"</a>
                            </span>
                        </Show>
                        <Button
                            attr:r#type="button"
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| state.modal.open(ModalKind::ApiUrl)
                        >
                            "Change Server"
                        </Button>
                    </div>
                </CardContent>
            </Card>
        </AuthShell>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let username = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let loading = RwSignal::new(false);

    let mismatch = Signal::derive(move || {
        let (p, c) = (password.get(), confirm.get());
        (!c.is_empty() && p != c).then(|| "Passwords do not match".to_string())
    });
    let signup_allowed = move || {
        state
            .server_info
            .with(|i| i.as_ref().is_none_or(|i| i.allow_internal_signup))
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() || mismatch.get_untracked().is_some() {
            return;
        }
        let full_name = name.get_untracked().trim().to_string();
        let body = CreateUser {
            username: username.get_untracked(),
            password: password.get_untracked(),
            name: (!full_name.is_empty()).then_some(full_name),
        };
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.create_user(&body).await {
                Ok(user) => {
                    tracing::info!(username = %user.username, "account created");
                    state.notify(ToastKind::Success, "created new account");
                    navigate.with_value(|nav| nav("/login", Default::default()));
                }
                Err(e) if e.status == FORBIDDEN => {
                    state.notify(ToastKind::Error, "server is not accepting new accounts");
                }
                Err(e) => state.report(&e, "creating account"),
            }
            loading.set(false);
        });
    };

    view! {
        <AuthShell>
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Create Account"</CardTitle>
                    <CardDescription class="text-xs">"Usernames are 3 to 30 letters or numbers."</CardDescription>
                </CardHeader>
                <CardContent>
                    <Show
                        when=signup_allowed
                        fallback=|| view! {
                            <Alert>
                                <AlertDescription class="text-xs">
                                    "This server is not accepting new accounts. "
                                    <a class="text-primary underline underline-offset-4" href="/login">"Back to login"</a>
                                </AlertDescription>
                            </Alert>
                        }
                    >
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="signup-username" class="text-xs">"Username"</Label>
                                <Input
                                    id="signup-username"
                                    placeholder="Username"
                                    autocomplete="username"
                                    pattern=USERNAME_PATTERN
                                    bind_value=username
                                    required=true
                                    autofocus=true
                                />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="signup-name" class="text-xs">"Full name (optional)"</Label>
                                <Input id="signup-name" placeholder="Full Name" autocomplete="name" bind_value=name />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="signup-password" class="text-xs">"Password"</Label>
                                <Input
                                    id="signup-password"
                                    r#type="password"
                                    autocomplete="new-password"
                                    bind_value=password
                                    required=true
                                />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="signup-confirm" class="text-xs">"Confirm password"</Label>
                                <Input
                                    id="signup-confirm"
                                    r#type="password"
                                    autocomplete="new-password"
                                    bind_value=confirm
                                    required=true
                                />
                            </div>
                            <FormError error=mismatch />
                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get() || mismatch.get().is_some()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Creating..." } else { "Create Account" }}
                                </span>
                            </Button>
                            <div class="pt-1 text-xs text-muted-foreground">
                                "Already have an account? "
                                <a class="text-primary underline underline-offset-4" href="/login">"Login"</a>
                            </div>
                        </form>
                    </Show>
                </CardContent>
            </Card>
        </AuthShell>
    }
}

/// Ends the session, then goes home.
#[component]
pub fn LogoutPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    Effect::new(move |_| {
        state.logout();
        navigate.with_value(|nav| nav("/", Default::default()));
    });

    view! {
        <AuthShell>
            <div class="flex items-center justify-center gap-2 text-xs text-muted-foreground">
                <Spinner />
                "Logging out..."
            </div>
        </AuthShell>
    }
}
