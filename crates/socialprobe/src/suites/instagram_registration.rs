//! Live-site registration form, filled and validated but never submitted.

use crate::page_object::PageObject;
use crate::pages::RegistrationPage;
use crate::result::ProbeResult;
use crate::scenario::{AnnotationKind, Scenario, ScenarioContext, ScenarioMeta};
use crate::test_data::{
    empty_form_data, generate_unique_user_data, invalid_email_data, weak_password_data,
};
use futures::future::BoxFuture;

const DESCRIBE: &str = "Instagram Registration";

/// Scenarios of this source
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![Scenario::new(
        ScenarioMeta::new(
            DESCRIBE,
            "should fill registration form and verify validations without submitting",
            file!(),
        )
        .with_tags(&["@registration", "@ui", "@form-validation", "@smoke"])
        .with_annotation(AnnotationKind::Feature, "Instagram Registration Form")
        .with_annotation(AnnotationKind::Severity, "high")
        .with_annotation(
            AnnotationKind::Story,
            "User should be able to fill registration form and see validation feedback",
        ),
        fill_and_validate,
    )]
}

fn fill_and_validate(ctx: &ScenarioContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let form = RegistrationPage::new(&ctx.page);
        let user = generate_unique_user_data();

        form.navigate().await?;
        form.wait_until_loaded().await?;

        ctx.step("Fill registration form with valid data", form.fill_form(&user))
            .await?;

        ctx.step("Verify form fields are filled correctly", form.expect_values(&user))
            .await?;

        ctx.step("Verify sign up button is enabled", async {
            ctx.page.expect(&form.sign_up_button).to_be_enabled().await
        })
        .await?;

        ctx.step("Test field validations with invalid data", async {
            let invalid_email = user.clone().with_overrides(&invalid_email_data());
            form.fill_email(&invalid_email.email).await?;
            let email_feedback = form.verify_email_validation().await;
            tracing::info!(?email_feedback, "email validation");

            let weak_password = user.clone().with_overrides(&weak_password_data());
            form.fill_password(&weak_password.password).await?;
            let password_feedback = form.verify_password_validation().await;
            tracing::info!(?password_feedback, "password validation");
            Ok(())
        })
        .await?;

        ctx.step("Verify form can be reset/cleared", async {
            form.clear_form().await?;
            form.expect_values(&empty_form_data()).await
        })
        .await
    })
}
