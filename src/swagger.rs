use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::ping::ping_handler,
        crate::handlers::default::default_route_handler,
        crate::handlers::otp::send::send_otp_handler,
        crate::handlers::otp::verify::verify_otp_handler,
        crate::handlers::registration::check::check_registration_handler,
        crate::handlers::registration::commit::commit_registration_handler,
        crate::handlers::login::login_handler,
    ),
    components(
        schemas(
            crate::models::SendOtpReq,
            crate::models::VerifyOtpReq,
            crate::models::CommitRegistrationReq,
            crate::models::LoginReq,

            crate::models::GenericResponse,
            crate::models::SendOtpResponse,
            crate::models::VerifyOtpResponse,
            crate::models::UniquenessResponse,
            crate::models::WorkerResponse,

            crate::models::RegistrantDraft,
            crate::models::WorkerRecord,
            crate::models::Gender,
            crate::models::WorkingCategory,
        )
    ),
    tags(
        (name = "Debugging API", description = "API for debugging purposes"),
        (name = "Otp API", description = "API for sending and verifying otp"),
        (name = "Registration API", description = "API for worker registration and login")
    )
)]
pub struct ApiDoc;
