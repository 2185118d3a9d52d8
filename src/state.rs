use std::sync::Arc;

use crate::config::AuthConfig;
use crate::database::CredentialStore;
use crate::services::doctor_service::DoctorService;
use crate::services::mail_service::OtpNotifier;
use crate::services::otp_service::OTPService;
use crate::services::pin_service::PinService;
use crate::services::token_service::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub otp_service: OTPService,
    pub pin_service: PinService,
    pub doctor_service: DoctorService,
    pub token_service: TokenService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn OtpNotifier>,
        config: AuthConfig,
    ) -> Self {
        let token_service = TokenService::new(&config);

        AppState {
            pin_service: PinService::new(store.clone(), &config),
            doctor_service: DoctorService::new(store.clone()),
            otp_service: OTPService::new(store, notifier, token_service.clone(), config),
            token_service,
        }
    }
}
