//! Toast Notifications
//!
//! A context-provided notification service instead of a function hung off
//! the window object: call [`use_toasts`] anywhere under [`provide_toasts`]
//! and `show` a message. [`ToastHost`] renders the stack.

use std::time::Duration;

use leptos::prelude::*;

/// How long a toast stays fully visible.
const VISIBLE_MS: u64 = 3000;
/// Fade-out animation length before the element is dropped.
const FADE_MS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
        }
    }
}

#[derive(Clone)]
struct Toast {
    id: u64,
    message: String,
    kind: ToastKind,
    leaving: RwSignal<bool>,
}

/// Handle to the notification service
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    /// Show a dismissing notification.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        let leaving = RwSignal::new(false);
        self.items.update(|items| {
            items.push(Toast {
                id,
                message: message.into(),
                kind,
                leaving,
            });
        });

        let items = self.items;
        set_timeout(
            move || {
                leaving.set(true);
                set_timeout(
                    move || items.update(|items| items.retain(|t| t.id != id)),
                    Duration::from_millis(FADE_MS),
                );
            },
            Duration::from_millis(VISIBLE_MS),
        );
    }
}

/// Install the service into context. Call once, at the app root.
pub fn provide_toasts() {
    provide_context(Toasts {
        items: RwSignal::new(Vec::new()),
        next_id: StoredValue::new(0),
    });
}

/// Grab the service from context.
pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

/// Renders the active toast stack
#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="toast-stack">
            <For
                each=move || toasts.items.get()
                key=|toast| toast.id
                children=move |toast| {
                    let class = move || {
                        format!(
                            "toast {} {}",
                            toast.kind.class(),
                            if toast.leaving.get() { "fade-out" } else { "fade-in" },
                        )
                    };
                    view! { <div class=class>{toast.message.clone()}</div> }
                }
            />
        </div>
    }
}
