use crate::modal::ModalHost;
use crate::pages::{
    AppLayout, HomePage, LoginPage, LogoutPage, ProfilePage, RootAuthed, ScratchPadPage,
    ShelfPage, SignupPage, UserPage,
};
use crate::state::{AppContext, AppState};
use crate::toast::ToastHost;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(AppContext(state));
    provide_context(state.toasts);

    state.load_server_info();
    state.refresh_me();

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context, modals included.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("signup") view=SignupPage />
                <Route path=path!("logout") view=LogoutPage />
                <Route path=path!("profile") view=move || view! {
                    <RootAuthed>
                        <AppLayout>
                            <ProfilePage />
                        </AppLayout>
                    </RootAuthed>
                } />
                <Route path=path!("scratch-pad") view=move || view! {
                    <AppLayout>
                        <ScratchPadPage />
                    </AppLayout>
                } />
                <Route path=path!("") view=move || view! {
                    <AppLayout>
                        <HomePage />
                    </AppLayout>
                } />
                <Route path=path!(":username") view=move || view! {
                    <AppLayout>
                        <UserPage />
                    </AppLayout>
                } />
                <Route path=path!(":username/:book_slug") view=move || view! {
                    <AppLayout>
                        <ShelfPage />
                    </AppLayout>
                } />
                <Route path=path!(":username/:book_slug/:note_slug") view=move || view! {
                    <AppLayout>
                        <ShelfPage />
                    </AppLayout>
                } />
            </Routes>
            <ModalHost />
        </Router>
        <ToastHost />
    }
}
