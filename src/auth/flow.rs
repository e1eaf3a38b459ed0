use std::sync::Arc;
use std::time::Duration;

use super::code_input::{CodeInput, CODE_LENGTH};
use super::countdown::{Countdown, RESEND_COOLDOWN_SECS};
use crate::backend::{IdentityProvider, ProviderResult};
use crate::error::ValidationError;

pub const MIN_PASSWORD_CHARS: usize = 6;
const LOGIN_CLOSE_DELAY: Duration = Duration::from_millis(1000);
const PASSWORD_CLOSE_DELAY: Duration = Duration::from_millis(1500);

/// Which form the auth modal is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    EnterEmail,
    VerifyCode,
    SetPassword,
    PasswordLogin,
    ForgotPassword,
    ResetPassword,
}

/// What the host should do after a response is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Stay,
    CloseAfter(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    SendCode { email: String },
    VerifyCode { email: String, code: String },
    UpdatePassword { password: String, step: AuthStep },
    PasswordLogin { email: String, password: String },
    ForgotPassword { email: String },
}

impl AuthCall {
    pub fn name(&self) -> &'static str {
        match self {
            AuthCall::SendCode { .. } => "send_code",
            AuthCall::VerifyCode { .. } => "verify_code",
            AuthCall::UpdatePassword { .. } => "update_password",
            AuthCall::PasswordLogin { .. } => "password_login",
            AuthCall::ForgotPassword { .. } => "forgot_password",
        }
    }
}

/// An identity-provider call prepared by the flow. Owns its data so it can
/// run on a background task while the UI keeps drawing.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    call: AuthCall,
    generation: u64,
}

/// Result of an [`AuthRequest`], fed back through [`AuthFlow::apply`]
#[derive(Debug)]
pub struct AuthResponse {
    call: AuthCall,
    generation: u64,
    result: ProviderResult<()>,
}

impl AuthRequest {
    pub fn call(&self) -> &AuthCall {
        &self.call
    }

    pub async fn execute(self, provider: &dyn IdentityProvider) -> AuthResponse {
        let result = match &self.call {
            AuthCall::SendCode { email } => provider.send_otp(email).await,
            AuthCall::VerifyCode { email, code } => provider.verify_otp(email, code).await,
            AuthCall::UpdatePassword { password, .. } => provider.update_password(password).await,
            AuthCall::PasswordLogin { email, password } => {
                provider.sign_in_with_password(email, password).await
            }
            AuthCall::ForgotPassword { email } => provider.request_password_reset(email).await,
        };

        if let Err(e) = &result {
            tracing::info!(call = self.call.name(), error = %e, "auth call rejected");
        }

        AuthResponse {
            call: self.call,
            generation: self.generation,
            result,
        }
    }
}

/// Check a new password and its confirmation. Mismatch is reported before
/// length.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// State machine behind the login / registration modal
pub struct AuthFlow {
    provider: Arc<dyn IdentityProvider>,
    open: bool,
    step: AuthStep,
    is_register: bool,
    email: String,
    password: String,
    confirmation: String,
    code: CodeInput,
    error: Option<String>,
    success: Option<String>,
    busy: bool,
    countdown: Countdown,
    generation: u64,
}

impl AuthFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            open: false,
            step: AuthStep::EnterEmail,
            is_register: true,
            email: String::new(),
            password: String::new(),
            confirmation: String::new(),
            code: CodeInput::new(),
            error: None,
            success: None,
            busy: false,
            countdown: Countdown::new(),
            generation: 0,
        }
    }

    pub fn provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.provider)
    }

    /// Show the modal. A recovery redirect jumps straight to the new
    /// password form.
    pub fn open(&mut self, recovery: bool) {
        self.open = true;
        if recovery {
            self.step = AuthStep::ResetPassword;
        }
    }

    /// Hide the modal and forget everything typed into it
    pub fn close(&mut self) {
        self.open = false;
        self.step = AuthStep::EnterEmail;
        self.is_register = true;
        self.clear_fields();
        self.busy = false;
        self.countdown.cancel();
        // responses still in flight belong to the old form
        self.generation += 1;
    }

    fn clear_fields(&mut self) {
        self.email.clear();
        self.password.clear();
        self.confirmation.clear();
        self.code.clear();
        self.error = None;
        self.success = None;
    }

    /// Move to another form, clearing typed values and messages
    pub fn switch_step(&mut self, step: AuthStep) {
        self.clear_fields();
        self.step = step;
    }

    /// Flip between "register" and "code login" on the email form
    pub fn toggle_register(&mut self) {
        self.is_register = !self.is_register;
        self.error = None;
        self.success = None;
    }

    /// "Register a new account" link from the password login form
    pub fn register_anew(&mut self) {
        self.is_register = true;
        self.switch_step(AuthStep::EnterEmail);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirmation(&mut self, confirmation: impl Into<String>) {
        self.confirmation = confirmation.into();
    }

    pub fn email_mut(&mut self) -> &mut String {
        &mut self.email
    }

    pub fn password_mut(&mut self) -> &mut String {
        &mut self.password
    }

    pub fn confirmation_mut(&mut self) -> &mut String {
        &mut self.confirmation
    }

    pub fn code_mut(&mut self) -> &mut CodeInput {
        &mut self.code
    }

    fn fail(&mut self, error: ValidationError) {
        self.error = Some(error.to_string());
    }

    fn request(&mut self, call: AuthCall) -> AuthRequest {
        self.busy = true;
        AuthRequest {
            call,
            generation: self.generation,
        }
    }

    /// Validate the current form and prepare its provider call.
    ///
    /// Returns `None` when nothing should be sent: busy, a required field
    /// is empty, or local validation failed (the error text is set).
    pub fn submit(&mut self) -> Option<AuthRequest> {
        if self.busy {
            return None;
        }
        self.error = None;

        let email = self.email.trim().to_string();
        let call = match self.step {
            AuthStep::EnterEmail | AuthStep::ForgotPassword if email.is_empty() => return None,
            AuthStep::EnterEmail => AuthCall::SendCode { email },
            AuthStep::ForgotPassword => AuthCall::ForgotPassword { email },
            AuthStep::VerifyCode => {
                let code = self.code.code();
                if code.chars().count() != CODE_LENGTH {
                    self.fail(ValidationError::IncompleteCode);
                    return None;
                }
                AuthCall::VerifyCode { email, code }
            }
            AuthStep::SetPassword | AuthStep::ResetPassword => {
                if let Err(e) = validate_new_password(&self.password, &self.confirmation) {
                    self.fail(e);
                    return None;
                }
                AuthCall::UpdatePassword {
                    password: self.password.clone(),
                    step: self.step,
                }
            }
            AuthStep::PasswordLogin => {
                if email.is_empty() || self.password.is_empty() {
                    return None;
                }
                AuthCall::PasswordLogin {
                    email,
                    password: self.password.clone(),
                }
            }
        };

        Some(self.request(call))
    }

    /// Re-send the one-time code once the cooldown has run out
    pub fn resend(&mut self) -> Option<AuthRequest> {
        if self.step != AuthStep::VerifyCode || !self.can_resend() {
            return None;
        }
        self.error = None;
        let email = self.email.trim().to_string();
        Some(self.request(AuthCall::SendCode { email }))
    }

    /// Fold a provider response back into the form
    pub fn apply(&mut self, response: AuthResponse) -> AuthOutcome {
        if response.generation != self.generation {
            tracing::debug!("dropping auth response for a closed form");
            return AuthOutcome::Stay;
        }
        self.busy = false;

        if let Err(e) = response.result {
            self.error = Some(e.message);
            return AuthOutcome::Stay;
        }

        match response.call {
            AuthCall::SendCode { email } => {
                self.success = Some(format!("验证码已发送到 {}，请查收邮件！", email));
                self.step = AuthStep::VerifyCode;
                self.countdown.start(RESEND_COOLDOWN_SECS);
                AuthOutcome::Stay
            }
            AuthCall::VerifyCode { .. } if self.is_register => {
                self.success = Some("验证成功！请设置你的密码".to_string());
                self.step = AuthStep::SetPassword;
                AuthOutcome::Stay
            }
            AuthCall::VerifyCode { .. } | AuthCall::PasswordLogin { .. } => {
                self.success = Some("登录成功！".to_string());
                AuthOutcome::CloseAfter(LOGIN_CLOSE_DELAY)
            }
            AuthCall::UpdatePassword { step, .. } => {
                let text = if step == AuthStep::ResetPassword {
                    "密码重置成功！"
                } else {
                    "注册成功！"
                };
                self.success = Some(text.to_string());
                AuthOutcome::CloseAfter(PASSWORD_CLOSE_DELAY)
            }
            AuthCall::ForgotPassword { .. } => {
                self.success = Some("重置密码邮件已发送！请查收邮箱。".to_string());
                AuthOutcome::Stay
            }
        }
    }

    /// Submit and wait for the provider in place
    pub async fn submit_and_wait(&mut self) -> AuthOutcome {
        match self.submit() {
            Some(request) => {
                let response = request.execute(self.provider.as_ref()).await;
                self.apply(response)
            }
            None => AuthOutcome::Stay,
        }
    }

    /// Resend and wait for the provider in place
    pub async fn resend_and_wait(&mut self) -> AuthOutcome {
        match self.resend() {
            Some(request) => {
                let response = request.execute(self.provider.as_ref()).await;
                self.apply(response)
            }
            None => AuthOutcome::Stay,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.step {
            AuthStep::EnterEmail if self.is_register => "✨ 注册新账号",
            AuthStep::EnterEmail => "📧 邮箱验证码登录",
            AuthStep::VerifyCode => "🔐 输入验证码",
            AuthStep::SetPassword => "🔑 设置密码",
            AuthStep::PasswordLogin => "🔑 密码登录",
            AuthStep::ForgotPassword => "🔑 找回密码",
            AuthStep::ResetPassword => "🔐 重置密码",
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> AuthStep {
        self.step
    }

    pub fn is_register(&self) -> bool {
        self.is_register
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirmation(&self) -> &str {
        &self.confirmation
    }

    pub fn code(&self) -> &CodeInput {
        &self.code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Seconds until resend unlocks
    pub fn countdown(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn can_resend(&self) -> bool {
        self.countdown.remaining() == 0 && !self.busy
    }
}
