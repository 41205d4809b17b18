//! Landing Page

use std::time::Duration;

use leptos::html;
use leptos::prelude::*;

use crate::api;
use crate::toast::{ToastKind, use_toasts};

/// Delay before the hard-coded demo preview appears.
const PREVIEW_DELAY_MS: u64 = 900;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Preview {
    Hidden,
    Loading,
    Ready,
}

#[component]
pub fn HomePage() -> impl IntoView {
    let toasts = use_toasts();

    // Stripe's cancel redirect lands back here with ?canceled=true.
    if window()
        .location()
        .search()
        .is_ok_and(|search| search.contains("canceled=true"))
    {
        toasts.show("Checkout was canceled. You have not been charged.", ToastKind::Error);
    }

    let file_input: NodeRef<html::Input> = NodeRef::new();
    let job_url_input: NodeRef<html::Input> = NodeRef::new();
    let email_input: NodeRef<html::Input> = NodeRef::new();

    let preview = RwSignal::new(Preview::Hidden);

    let on_upload_change = move |_| {
        let name = file_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
            .map(|file| file.name())
            .unwrap_or_else(|| "No file selected".into());
        leptos::logging::log!("Selected file: {name}");
    };

    // Demo only: a real build would ship the CV and job URL to the backend
    // and render the returned preview.
    let on_optimize = move |_| {
        let has_file = file_input
            .get()
            .and_then(|input| input.files())
            .is_some_and(|files| files.length() > 0);
        let job_url = job_url_input.get().map(|input| input.value()).unwrap_or_default();
        let email = email_input.get().map(|input| input.value()).unwrap_or_default();

        if !has_file || job_url.is_empty() || email.is_empty() {
            alert("Please upload a CV, enter the job URL and your email to preview.");
            return;
        }

        preview.set(Preview::Loading);
        set_timeout(
            move || preview.set(Preview::Ready),
            Duration::from_millis(PREVIEW_DELAY_MS),
        );
    };

    let on_download = move |_| {
        let email = email_input.get().map(|input| input.value()).unwrap_or_default();
        if email.is_empty() {
            alert("Please enter your email before downloading.");
            return;
        }

        leptos::task::spawn_local(async move {
            match api::create_checkout(&email).await {
                Ok(url) => {
                    let _ = window().location().set_href(&url);
                }
                Err(err) => {
                    leptos::logging::error!("checkout failed: {err}");
                    alert("Unable to start payment flow. Check console for details.");
                }
            }
        });
    };

    // Stand-in: the contact form is not wired to a backend.
    let on_contact_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        toasts.show("Form submitted successfully!", ToastKind::Success);
    };

    view! {
        <div class="home">
            <header class="topbar">
                <span class="brand">"cvlift"</span>
                <nav>
                    <a href="#features" on:click=move |ev| scroll_to(&ev, "features")>
                        "Features"
                    </a>
                    <a href="#optimizer" on:click=move |ev| scroll_to(&ev, "optimizer")>
                        "Try it"
                    </a>
                    <a href="#contact" on:click=move |ev| scroll_to(&ev, "contact")>
                        "Contact"
                    </a>
                </nav>
            </header>

            <section class="hero">
                <h1>"Land more interviews"</h1>
                <p class="tagline">
                    "Upload your CV, paste the job listing, and get a version tailored to the role."
                </p>
                <button class="btn btn-primary" on:click=move |ev| scroll_to(&ev, "optimizer")>
                    "Optimize my CV"
                </button>
            </section>

            <section class="features" id="features">
                <div class="feature">
                    <h3>"Tailored"</h3>
                    <p>"Keywords and phrasing matched to the listing you are applying for."</p>
                </div>
                <div class="feature">
                    <h3>"Fast"</h3>
                    <p>"A preview in seconds, the full version right after checkout."</p>
                </div>
                <div class="feature">
                    <h3>"Private"</h3>
                    <p>"Your CV is processed for your download only and never resold."</p>
                </div>
            </section>

            <section class="optimizer" id="optimizer">
                <div class="card">
                    <h2>"Try it now"</h2>
                    <label for="file-upload">"Your current CV"</label>
                    <input
                        type="file"
                        id="file-upload"
                        node_ref=file_input
                        on:change=on_upload_change
                    />
                    <label for="job-url">"Job listing URL"</label>
                    <input
                        type="url"
                        id="job-url"
                        placeholder="https://jobs.example.com/listing/123"
                        node_ref=job_url_input
                    />
                    <label for="email">"Email"</label>
                    <input
                        type="email"
                        id="email"
                        placeholder="you@example.com"
                        node_ref=email_input
                    />
                    <button class="btn btn-primary" on:click=on_optimize>
                        "Optimize"
                    </button>
                </div>

                <div class="card preview-card" class:hidden=move || preview.get() == Preview::Hidden>
                    <h3>"Optimized preview"</h3>
                    {move || match preview.get() {
                        Preview::Hidden => ().into_any(),
                        Preview::Loading => {
                            view! { <p class="muted">"Generating preview…"</p> }.into_any()
                        }
                        Preview::Ready => {
                            view! {
                                <p>
                                    <strong>"Professional summary: "</strong>
                                    "Results-driven Product Manager with 5+ years leading \
                                     cross-functional teams to deliver revenue growth and \
                                     operational improvements."
                                </p>
                                <p>
                                    <strong>"Highlighted experience: "</strong>
                                    "Led a team of 6 to increase conversion by 24% (A/B tests, \
                                     UX improvements)."
                                </p>
                                <p class="muted">
                                    "Keywords added: product management, A/B testing, conversion \
                                     optimization, stakeholder management."
                                </p>
                            }
                            .into_any()
                        }
                    }}
                    <button class="btn btn-primary" on:click=on_download>
                        "Download full version"
                    </button>
                </div>
            </section>

            <section class="contact" id="contact">
                <h2>"Questions?"</h2>
                <form on:submit=on_contact_submit>
                    <input type="text" placeholder="Your name" />
                    <input type="email" placeholder="Your email" />
                    <textarea placeholder="How can we help?"></textarea>
                    <button type="submit" class="btn">
                        "Send"
                    </button>
                </form>
            </section>

            <footer class="footer">
                <p>"cvlift - demo application"</p>
            </footer>
        </div>
    }
}

fn scroll_to(ev: &leptos::ev::MouseEvent, id: &str) {
    ev.prevent_default();
    if let Some(target) = document().get_element_by_id(id) {
        let options = web_sys::ScrollIntoViewOptions::new();
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        target.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}
