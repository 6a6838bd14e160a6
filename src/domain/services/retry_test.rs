use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::is_client_error;
use super::retry_api_call;
use super::RetryPolicy;
use crate::domain::models::ApiError;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    return RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
    };
}

#[test]
fn it_detects_client_error_markers() {
    assert!(is_client_error("Request failed with status code 404"));
    assert!(is_client_error("422: The given data was invalid."));
    assert!(is_client_error("HTTP 429 Too Many Requests"));
    assert!(!is_client_error("Request failed with status code 500"));
    assert!(!is_client_error("Network error: unable to reach the server"));
    assert!(!is_client_error("Order 4040 could not be found"));
    assert!(!is_client_error("Upload limit is 400MB"));
}

#[test]
fn it_doubles_the_delay_each_attempt() {
    let policy = RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(250),
    };

    assert_eq!(policy.delay_for(1), Duration::from_millis(250));
    assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
    assert_eq!(policy.delay_for(4), Duration::from_millis(2000));
}

#[test]
fn it_defaults_to_three_attempts_from_one_second() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_delay, Duration::from_millis(1000));
}

#[tokio::test]
async fn it_returns_the_first_success() {
    let calls = AtomicU32::new(0);
    let res = retry_api_call(&fast_policy(3), || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst);
        return async move {
            if attempt == 0 {
                return Err(ApiError::new("Request failed with status code 503"));
            }
            return Ok(attempt);
        };
    })
    .await;

    assert_eq!(res, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn it_does_not_retry_client_errors() {
    let calls = AtomicU32::new(0);
    let res = retry_api_call(&fast_policy(5), || {
        calls.fetch_add(1, Ordering::SeqCst);
        return async {
            return Err::<(), _>(ApiError::new("Request failed with status code 404"));
        };
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Request failed with status code 404");
}

#[tokio::test]
async fn it_does_not_retry_errors_from_4xx_responses() {
    let calls = AtomicU32::new(0);
    let res = retry_api_call(&fast_policy(5), || {
        calls.fetch_add(1, Ordering::SeqCst);
        return async {
            return Err::<(), _>(ApiError::with_status(401, "Unauthenticated."));
        };
    })
    .await;

    assert!(res.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn it_retries_server_errors_up_to_the_limit() {
    let calls = AtomicU32::new(0);
    let res = retry_api_call(&fast_policy(4), || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        return async move {
            return Err::<(), _>(ApiError::new(format!("Server error on attempt {attempt}")));
        };
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Server error on attempt 4");
}

#[tokio::test]
async fn it_always_makes_at_least_one_attempt() {
    let calls = AtomicU32::new(0);
    let res = retry_api_call(&fast_policy(0), || {
        calls.fetch_add(1, Ordering::SeqCst);
        return async {
            return Err::<(), _>(ApiError::network());
        };
    })
    .await;

    assert!(res.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn it_sleeps_a_doubling_delay_between_attempts() {
    let policy = RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(100),
    };
    let start = Instant::now();
    let attempts_at = Mutex::new(vec![]);

    let res = retry_api_call(&policy, || {
        attempts_at
            .lock()
            .unwrap()
            .push(start.elapsed().as_millis());
        return async {
            return Err::<(), _>(ApiError::new("Request failed with status code 503"));
        };
    })
    .await;

    assert!(res.is_err());
    assert_eq!(*attempts_at.lock().unwrap(), vec![0, 100, 300, 700]);
}
