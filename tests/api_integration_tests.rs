use dotenv::dotenv;
use meal_planner::api_connection::{
    connection::build_messages,
    endpoints::{ChatCompletionRequest, Provider},
    ApiConnectionError, PlanGenerator,
};
use meal_planner::config::PlannerConfig;
use meal_planner::planner::generate_day_plan;
use meal_planner::PlannerError;
use serde_json::json;
use std::env;

const TEST_API_KEY_ENV_VAR: &str = "DEEPSEEK_API_KEY";

fn setup_test_environment() {
    dotenv().ok();
}

fn config_with_key_var(key_var: &str) -> PlannerConfig {
    PlannerConfig {
        api_key_env_var: key_var.to_string(),
        ..PlannerConfig::default()
    }
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::deepseek(&config_with_key_var("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ"));
    let request = ChatCompletionRequest {
        model: provider.model().to_string(),
        messages: build_messages("Hello", &[]),
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_missing_api_key_is_a_configuration_error() {
    setup_test_environment();
    let config = config_with_key_var("ANOTHER_KEY_THAT_SHOULD_NOT_EXIST_QWERTY");
    let provider = Provider::deepseek(&config);
    let raw = json!({"goal": "balanced"});

    let err = generate_day_plan(&raw, &config, &provider).await.unwrap_err();
    assert!(matches!(err, PlannerError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_invalid_request_fails_before_any_call() {
    setup_test_environment();
    let config = config_with_key_var("ANOTHER_KEY_THAT_SHOULD_NOT_EXIST_QWERTY");
    let provider = Provider::deepseek(&config);

    let err = generate_day_plan(&json!({}), &config, &provider).await.unwrap_err();
    assert!(matches!(err, PlannerError::InvalidRequest(_)));
}

#[tokio::test]
#[ignore]
async fn test_successful_day_plan_call() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_successful_day_plan_call: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let config = PlannerConfig::from_env();
    let provider = Provider::deepseek(&config);
    let raw = json!({
        "goal": "loss",
        "profile": {"age": 32, "heightCm": 168, "weightKg": 72, "allergies": ["花生"]},
        "preferences": {"cuisine": "中式", "caloriePreference": "low"}
    });

    let plan = generate_day_plan(&raw, &config, &provider).await;
    assert!(plan.is_ok(), "API call failed: {:?}", plan.err());
    let plan = plan.unwrap();
    assert!(!plan.meals.is_empty());
    assert!(plan.days.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_api_error_with_invalid_key() {
    setup_test_environment();

    const INVALID_KEY_ENV_NAME_FOR_THIS_TEST: &str = "ENV_VAR_WITH_BAD_DEEPSEEK_KEY_VALUE";
    unsafe {
        std::env::set_var(
            INVALID_KEY_ENV_NAME_FOR_THIS_TEST,
            "this_is_a_deliberately_bad_api_key_string_for_testing",
        );
    }

    let provider = Provider::deepseek(&config_with_key_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST));
    let result = provider.generate("This call should fail due to invalid key.", &[]).await;
    assert!(
        matches!(result, Err(ApiConnectionError::ApiError { .. })),
        "Expected ApiError, got {:?}",
        result
    );
    if let Err(ApiConnectionError::ApiError { status, .. }) = result {
        assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    }

    unsafe {
        std::env::remove_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    }
}
