//! Opportunistic login: detect a login form, fill credentials, verify the
//! fill stuck, submit, and never try again for the rest of the crawl.
//!
//! Detection is a pure function over the page snapshot so it can be tested
//! without a driver; the chosen selectors are then driven through the
//! [`Driver`] interface. The state machine has exactly two states and the
//! `attempted` transition is one-way: success and failure both consume the
//! single attempt.

use crate::config::Credentials;
use crate::driver::Driver;
use crate::element::RawElement;
use crate::error::Result;
use std::time::Duration;
use tracing::{info, warn};

/// Bounded wait after clicking the submit control; expiry is tolerated.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

const BROAD_USER_SELECTOR: &str = "input[type=\"text\"], input[type=\"email\"], \
     input[name*=\"user\"], input[name*=\"email\"], input[id*=\"user\"], input[id*=\"email\"]";

const BROAD_PASS_SELECTOR: &str = "input[type=\"password\"], input[name*=\"pass\"]";

const SUBMIT_SELECTOR: &str =
    "button[type=\"submit\"], input[type=\"submit\"], button:not([type=\"button\"])";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    /// Terminal for the crawl, regardless of how the attempt went.
    Attempted,
}

/// How a single login attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Already attempted this crawl, or no usable credentials configured.
    Skipped,
    /// No login form on this page; the engine stays idle.
    NoFormFound,
    /// The identity field did not retain the filled value.
    VerificationFailed,
    /// Credentials filled but no submit control was found.
    FilledWithoutSubmit,
    /// Credentials filled and the form was submitted.
    Submitted,
    /// The driver errored mid-sequence.
    Failed,
}

/// Selectors chosen for one detected login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub user_selector: String,
    pub pass_selector: String,
    pub submit_selector: String,
}

/// Heuristic login form detection over a page snapshot.
///
/// A form is present when a username/email-like input and a password-like
/// input coexist. Exact `name` matches are preferred so a generic text
/// input does not shadow the real field.
pub fn detect_login_form(elements: &[RawElement]) -> Option<LoginForm> {
    let inputs: Vec<&RawElement> = elements.iter().filter(|el| el.tag == "input").collect();

    let has_exact_name = |name: &str| inputs.iter().any(|el| el.name_attr() == Some(name));

    let user_selector = if has_exact_name("username") {
        "input[name=\"username\"]".to_string()
    } else if has_exact_name("email") {
        "input[name=\"email\"]".to_string()
    } else if has_exact_name("login") {
        "input[name=\"login\"]".to_string()
    } else if inputs.iter().any(|el| is_identity_like(el)) {
        BROAD_USER_SELECTOR.to_string()
    } else {
        return None;
    };

    let pass_selector = if has_exact_name("password") {
        "input[name=\"password\"]".to_string()
    } else if inputs.iter().any(|el| is_password_like(el)) {
        BROAD_PASS_SELECTOR.to_string()
    } else {
        return None;
    };

    Some(LoginForm {
        user_selector,
        pass_selector,
        submit_selector: SUBMIT_SELECTOR.to_string(),
    })
}

fn is_identity_like(el: &RawElement) -> bool {
    if matches!(el.input_type().as_deref(), Some("text" | "email")) {
        return true;
    }
    let name = el.name_attr().unwrap_or_default().to_ascii_lowercase();
    let id = el.id.as_deref().unwrap_or_default().to_ascii_lowercase();
    ["user", "email"]
        .iter()
        .any(|hint| name.contains(hint) || id.contains(hint))
}

fn is_password_like(el: &RawElement) -> bool {
    el.input_type().as_deref() == Some("password")
        || el
            .name_attr()
            .is_some_and(|name| name.to_ascii_lowercase().contains("pass"))
}

/// Pick the credential value for the identity field. An explicit
/// `use_email` wins; otherwise an email-specific field gets the email and
/// anything else gets the username, falling back to whichever exists.
fn choose_identity(credentials: &Credentials, form: &LoginForm) -> Option<String> {
    if credentials.use_email && credentials.email.is_some() {
        return credentials.email.clone();
    }
    if form.user_selector.contains("email") && credentials.email.is_some() {
        return credentials.email.clone();
    }
    credentials.username.clone().or_else(|| credentials.email.clone())
}

#[derive(Debug)]
pub struct LoginEngine {
    state: LoginState,
}

impl LoginEngine {
    pub fn new() -> Self {
        Self {
            state: LoginState::Idle,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn attempted(&self) -> bool {
        self.state == LoginState::Attempted
    }

    /// Attempt a login on the current page, at most once per crawl.
    ///
    /// The transition to `Attempted` happens the moment a form is detected
    /// with usable credentials; everything after that point can fail
    /// without the crawl noticing beyond a warning.
    pub async fn try_login<D: Driver>(
        &mut self,
        driver: &mut D,
        credentials: &Credentials,
        elements: &[RawElement],
        page_url: &str,
    ) -> LoginOutcome {
        if self.attempted() || !credentials.usable() {
            return LoginOutcome::Skipped;
        }
        let Some(form) = detect_login_form(elements) else {
            return LoginOutcome::NoFormFound;
        };

        info!("Found login form on {}", page_url);
        self.state = LoginState::Attempted;

        match run_sequence(driver, credentials, &form).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Login attempt on {} failed: {}", page_url, e);
                LoginOutcome::Failed
            }
        }
    }
}

async fn run_sequence<D: Driver>(
    driver: &mut D,
    credentials: &Credentials,
    form: &LoginForm,
) -> Result<LoginOutcome> {
    // usable() guarantees an identity and a password exist
    let Some(identity) = choose_identity(credentials, form) else {
        return Ok(LoginOutcome::Skipped);
    };
    let password = credentials.password.clone().unwrap_or_default();

    driver.fill(&form.user_selector, &identity).await?;

    // Read the field back before touching the password: a fill that did
    // not stick means the page is doing something we don't understand,
    // and half-filled credentials are worse than none.
    let retained = driver.read_value(&form.user_selector).await?;
    if retained != identity {
        warn!("Identity field did not retain the filled value");
        return Ok(LoginOutcome::VerificationFailed);
    }

    driver.fill(&form.pass_selector, &password).await?;

    if !driver.click(&form.submit_selector).await? {
        return Ok(LoginOutcome::FilledWithoutSubmit);
    }
    if let Err(e) = driver.wait_for_settle(SETTLE_TIMEOUT).await {
        warn!("Settle wait after login submit: {}", e);
    }
    info!("Login form submitted");
    Ok(LoginOutcome::Submitted)
}

impl Default for LoginEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Rect;
    use std::collections::BTreeMap;

    fn input(attrs: &[(&str, &str)]) -> RawElement {
        RawElement {
            tag: "input".to_string(),
            id: attrs
                .iter()
                .find(|(k, _)| *k == "id")
                .map(|(_, v)| v.to_string()),
            class: None,
            text: None,
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
            ancestors: vec!["form".to_string(), "body".to_string()],
        }
    }

    #[test]
    fn prefers_exact_username_name() {
        let form = detect_login_form(&[
            input(&[("type", "text"), ("name", "username")]),
            input(&[("type", "password"), ("name", "password")]),
        ])
        .unwrap();
        assert_eq!(form.user_selector, "input[name=\"username\"]");
        assert_eq!(form.pass_selector, "input[name=\"password\"]");
    }

    #[test]
    fn falls_back_to_email_then_login_names() {
        let form = detect_login_form(&[
            input(&[("type", "email"), ("name", "email")]),
            input(&[("type", "password")]),
        ])
        .unwrap();
        assert_eq!(form.user_selector, "input[name=\"email\"]");
        assert_eq!(form.pass_selector, BROAD_PASS_SELECTOR);

        let form = detect_login_form(&[
            input(&[("type", "text"), ("name", "login")]),
            input(&[("type", "password")]),
        ])
        .unwrap();
        assert_eq!(form.user_selector, "input[name=\"login\"]");
    }

    #[test]
    fn broad_fallback_when_no_exact_names() {
        let form = detect_login_form(&[
            input(&[("type", "text"), ("name", "acct_user_field")]),
            input(&[("type", "password"), ("name", "acct_pass_field")]),
        ])
        .unwrap();
        assert_eq!(form.user_selector, BROAD_USER_SELECTOR);
    }

    #[test]
    fn no_form_without_password_input() {
        assert!(detect_login_form(&[input(&[("type", "text"), ("name", "username")])]).is_none());
    }

    #[test]
    fn no_form_without_identity_input() {
        assert!(detect_login_form(&[input(&[("type", "password")])]).is_none());
    }

    #[test]
    fn non_input_tags_are_ignored() {
        let mut form_el = input(&[]);
        form_el.tag = "form".to_string();
        assert!(detect_login_form(&[form_el]).is_none());
    }

    #[test]
    fn identity_choice_honors_use_email() {
        let form = LoginForm {
            user_selector: "input[name=\"username\"]".to_string(),
            pass_selector: "input[name=\"password\"]".to_string(),
            submit_selector: SUBMIT_SELECTOR.to_string(),
        };
        let creds = Credentials {
            username: Some("alice".to_string()),
            email: Some("alice@x.com".to_string()),
            password: Some("pw".to_string()),
            use_email: true,
        };
        assert_eq!(choose_identity(&creds, &form).unwrap(), "alice@x.com");

        let creds = Credentials {
            use_email: false,
            ..creds
        };
        assert_eq!(choose_identity(&creds, &form).unwrap(), "alice");
    }

    #[test]
    fn email_specific_field_gets_the_email() {
        let form = LoginForm {
            user_selector: "input[name=\"email\"]".to_string(),
            pass_selector: "input[name=\"password\"]".to_string(),
            submit_selector: SUBMIT_SELECTOR.to_string(),
        };
        let creds = Credentials {
            username: Some("alice".to_string()),
            email: Some("alice@x.com".to_string()),
            password: Some("pw".to_string()),
            use_email: false,
        };
        assert_eq!(choose_identity(&creds, &form).unwrap(), "alice@x.com");
    }
}
