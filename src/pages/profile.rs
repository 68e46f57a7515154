use crate::components::ui::{Button, ButtonSize, Card, CardContent, CardHeader, CardTitle};
use crate::modal::ModalKind;
use crate::state::AppContext;
use leptos::prelude::*;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let username = move || state.me.with(|m| m.as_ref().map(|u| u.username.clone()).unwrap_or_default());
    let full_name = move || state.me.with(|m| m.as_ref().and_then(|u| u.name.clone()).unwrap_or_default());

    view! {
        <Card class="max-w-lg">
            <CardHeader>
                <CardTitle class="text-lg">"My Profile"</CardTitle>
            </CardHeader>
            <CardContent class="space-y-4">
                <dl class="grid grid-cols-[max-content_1fr] gap-x-4 gap-y-1 text-sm">
                    <dt class="text-muted-foreground">"Username"</dt>
                    <dd>{username}</dd>
                    <dt class="text-muted-foreground">"Full name"</dt>
                    <dd>{full_name}</dd>
                </dl>
                <div class="flex gap-2">
                    <Button size=ButtonSize::Sm on:click=move |_| state.modal.open(ModalKind::EditProfile)>
                        "Update Profile"
                    </Button>
                    <Button size=ButtonSize::Sm on:click=move |_| state.modal.open(ModalKind::ChangePassword)>
                        "Change Password"
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}
