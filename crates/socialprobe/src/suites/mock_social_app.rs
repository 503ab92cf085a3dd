//! Mock social app scenarios. The runner installs the mock app routes on
//! every page of the mock project, so nothing here reaches the network.

use crate::pages::{generate_test_data, DemoPage, MockSocialAppPage, WorkflowProgress};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{AnnotationKind, Scenario, ScenarioContext, ScenarioMeta};
use futures::future::BoxFuture;

const DESCRIBE: &str = "Mock Social App - Track B";
const SUITE_TAGS: &[&str] = &["@mock", "@track-b", "@social-app"];

fn meta(title: &str) -> ScenarioMeta {
    ScenarioMeta::new(DESCRIBE, title, file!()).with_tags(SUITE_TAGS)
}

/// Scenarios of this source
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            meta("Simple mock functionality test")
                .with_tags(&["@smoke", "@demo"])
                .with_annotation(AnnotationKind::Feature, "Basic Mock App Functionality")
                .with_annotation(AnnotationKind::Severity, "critical")
                .with_annotation(AnnotationKind::Story, "Verify mock application loads and works"),
            simple_functionality,
        ),
        Scenario::new(
            meta("Mock workflow demonstration")
                .with_tags(&["@workflow", "@demo"])
                .with_annotation(AnnotationKind::Feature, "Mock Workflow")
                .with_annotation(AnnotationKind::Severity, "high")
                .with_annotation(AnnotationKind::Story, "Demonstrate mock social app workflow"),
            workflow_demonstration,
        ),
        Scenario::new(
            meta("API demo registration and profile flow")
                .with_tags(&["@api-demo", "@workflow"])
                .with_annotation(AnnotationKind::Feature, "Mock API Demo")
                .with_annotation(AnnotationKind::Severity, "high")
                .with_annotation(
                    AnnotationKind::Story,
                    "Register, log in, browse the feed, edit the profile and log out",
                ),
            api_demo_flow,
        ),
    ]
}

fn simple_functionality(ctx: &ScenarioContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let demo = DemoPage::with_origin(&ctx.page, ctx.mock_origin());

        ctx.step("Navigate to mock app", demo.navigate()).await?;

        ctx.step("Verify basic functionality", async {
            let content = ctx.page.expect(&demo.demo_content);
            content.to_be_visible().await?;
            content
                .to_contain_text("This is a demonstration of Track B")
                .await
        })
        .await?;

        ctx.step("Test interactive elements", async {
            demo.click_demo_button().await?;
            ctx.page
                .expect(&demo.demo_result)
                .to_contain_text("Button clicked successfully!")
                .await
        })
        .await
    })
}

fn workflow_demonstration(ctx: &ScenarioContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let demo = DemoPage::with_origin(&ctx.page, ctx.mock_origin());
        let t = chrono::Utc::now().timestamp_millis();
        let email = format!("user{t}@example.com");
        let username = format!("user{t}");

        ctx.step("Start at demo page", demo.navigate()).await?;
        ctx.step("Start workflow", demo.start_workflow()).await?;
        ctx.step("Fill registration data", demo.fill_workflow(&email, &username))
            .await?;

        ctx.step("Complete workflow step", async {
            demo.next_step().await?;
            match demo.workflow_progress(ctx.page.timeouts().expect()).await? {
                WorkflowProgress::StepTwo => demo.finish_workflow("Test User").await,
                WorkflowProgress::Result => Ok(()),
                WorkflowProgress::Neither => Err(ProbeError::assertion(
                    "neither #step2 nor #workflow-result became visible",
                )),
            }
        })
        .await
    })
}

fn api_demo_flow(ctx: &ScenarioContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let app = MockSocialAppPage::with_origin(&ctx.page, ctx.mock_origin());
        let user = generate_test_data();

        ctx.step("Register a new account", async {
            app.navigate_to_register().await?;
            app.fill_registration_form(&user).await?;
            app.submit_registration().await?;
            app.verify_registration_success().await
        })
        .await?;

        ctx.step("Log in", async {
            app.navigate_to_login().await?;
            app.perform_login(&user.username, &user.password).await?;
            app.verify_login_success().await
        })
        .await?;

        ctx.step("Browse the feed", async {
            app.verify_feed_content().await?;
            app.verify_navigation_elements().await
        })
        .await?;

        ctx.step("Edit the profile", async {
            app.navigate_to_profile().await?;
            app.verify_profile_info(&user.username).await?;
            app.verify_profile_editing_elements().await?;
            app.edit_profile(&format!("{} Updated", user.full_name)).await?;
            app.verify_profile_update_success().await
        })
        .await?;

        ctx.step("Log out", async {
            app.logout().await?;
            app.verify_logout_success().await
        })
        .await
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{SuiteConfig, TRACK_B};
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::mock_app::social_app_routes;
    use crate::page::{Page, Timeouts};
    use crate::scenario::StepLog;
    use std::sync::Arc;

    fn context(driver: Arc<MockDriver>) -> ScenarioContext {
        let project = SuiteConfig::default().resolve_project(TRACK_B).unwrap();
        ScenarioContext {
            page: Page::new(driver).with_timeouts(Timeouts {
                action_ms: 50,
                navigation_ms: 50,
                expect_ms: 50,
            }),
            steps: StepLog::new(),
            routes: Some(social_app_routes(project.mock_origin.as_deref().unwrap())),
            project,
            attempt: 0,
        }
    }

    fn demo_document() -> MockDriver {
        MockDriver::new()
            .with_element("h1", MockElement::text("Mock Social App Demo"))
            .with_element(
                "#demo-content",
                MockElement::text("This is a demonstration of Track B - Mock Social Application functionality."),
            )
            .with_element("#demo-button", MockElement::text("Click Me"))
            .with_element("#demo-result", MockElement::text("").hidden())
            .on_click(
                "#demo-button",
                vec![
                    MockEffect::SetText {
                        selector: "#demo-result".into(),
                        text: "Button clicked successfully!".into(),
                    },
                    MockEffect::Show("#demo-result".into()),
                ],
            )
    }

    #[tokio::test]
    async fn test_simple_functionality() {
        let driver = Arc::new(demo_document());
        let ctx = context(driver.clone());
        simple_functionality(&ctx).await.unwrap();
        assert!(driver.was_called("goto:http://localhost:3001/demo"));
        assert_eq!(ctx.steps.records().len(), 3);
    }

    #[tokio::test]
    async fn test_workflow_result_only_is_enough() {
        let driver = Arc::new(
            demo_document()
                .with_element("#start-workflow", MockElement::text("Start Registration Workflow"))
                .with_element("#workflow-step", MockElement::text("Step 1: Registration"))
                .with_element("#workflow-email", MockElement::input())
                .with_element("#workflow-username", MockElement::input())
                .with_element("#workflow-next", MockElement::text("Next Step"))
                .on_click(
                    "#workflow-next",
                    vec![MockEffect::Insert {
                        selector: "#workflow-result".into(),
                        element: MockElement::text("Registration completed"),
                    }],
                ),
        );
        let ctx = context(driver);
        workflow_demonstration(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_workflow_without_progress_fails_its_step() {
        let driver = Arc::new(
            demo_document()
                .with_element("#start-workflow", MockElement::text("Start Registration Workflow"))
                .with_element("#workflow-step", MockElement::text("Step 1: Registration"))
                .with_element("#workflow-email", MockElement::input())
                .with_element("#workflow-username", MockElement::input())
                .with_element("#workflow-next", MockElement::text("Next Step")),
        );
        let ctx = context(driver);
        let err = workflow_demonstration(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("#step2"));
        let steps = ctx.steps.records();
        assert_eq!(steps.last().unwrap().title, "Complete workflow step");
        assert!(steps.last().unwrap().error.is_some());
    }

    #[test]
    fn test_metadata() {
        let all = scenarios();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|s| s.meta.has_tag("@track-b")));
        assert_eq!(all[0].meta.annotation(AnnotationKind::Severity), Some("critical"));
    }
}
