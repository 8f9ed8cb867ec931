//! Lifecycle tests: the wrappers under test are the ones `tether-codegen`
//! synthesized for `endpoints.json`, driven against a recording runtime.

use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};
use tether_core::{
    AuthInfo, Context, Error, ErrorCode,
    raw::{BufferedResponse, Request},
    runtime::{self, Call, CallHandle, CallParams, RequestData, RuntimeContract},
};
use tether_tests::{app, wrappers::*};

// -----------------------------------------------------------------------------
// Recording runtime
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
enum Event {
    BeginCall,
    BeginReq,
    FinishReq {
        data: Option<Vec<u8>>,
        err: Option<ErrorCode>,
    },
    Finish {
        err: Option<ErrorCode>,
    },
}

#[derive(Default)]
struct Journal {
    events: Mutex<Vec<Event>>,
    endpoints: Mutex<Vec<&'static str>>,
    requests: Mutex<Vec<RequestData>>,
}

impl Journal {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn endpoints(&self) -> Vec<&'static str> {
        self.endpoints.lock().unwrap().clone()
    }

    fn request(&self) -> RequestData {
        self.requests.lock().unwrap().last().cloned().expect("begin_req recorded")
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn finish_reqs(&self) -> usize {
        self.count(|e| matches!(e, Event::FinishReq { .. }))
    }

    fn finishes(&self) -> usize {
        self.count(|e| matches!(e, Event::Finish { .. }))
    }
}

struct Recording {
    journal: Arc<Journal>,
    refuse_calls: bool,
}

impl Recording {
    fn new() -> (Arc<Self>, Arc<Journal>) {
        Self::build(false)
    }

    fn refusing() -> (Arc<Self>, Arc<Journal>) {
        Self::build(true)
    }

    fn build(refuse_calls: bool) -> (Arc<Self>, Arc<Journal>) {
        let journal = Arc::new(Journal::default());
        let runtime = Arc::new(Self {
            journal: Arc::clone(&journal),
            refuse_calls,
        });

        (runtime, journal)
    }
}

impl RuntimeContract for Recording {
    fn begin_call(&self, params: CallParams) -> Result<Call, Error> {
        self.journal.push(Event::BeginCall);
        self.journal.endpoints.lock().unwrap().push(params.endpoint);
        if self.refuse_calls {
            return Err(Error::new(ErrorCode::Unavailable, "tracing offline".to_string()));
        }

        Ok(Arc::new(RecordedCall {
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct RecordedCall {
    journal: Arc<Journal>,
}

impl CallHandle for RecordedCall {
    fn begin_req(&self, ctx: &Context, data: RequestData) -> Result<(), Error> {
        self.journal.push(Event::BeginReq);
        let require_auth = data.require_auth;
        self.journal.requests.lock().unwrap().push(data);

        if require_auth && ctx.auth().is_none() {
            return Err(Error::unauthenticated(
                "endpoint requires auth but none provided",
            ));
        }

        Ok(())
    }

    fn finish_req(&self, data: Option<&[u8]>, err: Option<&Error>) {
        self.journal.push(Event::FinishReq {
            data: data.map(<[u8]>::to_vec),
            err: err.map(|e| e.code),
        });
    }

    fn finish(&self, err: Option<&Error>) {
        self.journal.push(Event::Finish {
            err: err.map(|e| e.code),
        });
    }
}

async fn bounded<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("wrapper returned in bounded time")
}

async fn settled(journal: &Journal, finishes: usize) {
    bounded(async {
        while journal.finishes() < finishes {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
}

// -----------------------------------------------------------------------------
// Typed endpoints
// -----------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn success_runs_every_step_once_in_order() {
    let (rt, journal) = Recording::new();

    let greeting = runtime::scope(rt, bounded(__encore_Hello_Greet(Context::new(), "a b".into())))
        .await
        .expect("greeting");

    assert_eq!(greeting.message, "hello a b");
    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq {
                data: Some(br#"[{"message":"hello a b"}]"#.to_vec()),
                err: None,
            },
            Event::Finish { err: None },
        ]
    );

    let req = journal.request();
    assert_eq!(req.path, "/hello/a%20b");
    assert_eq!(
        req.path_segments,
        Some(vec![runtime::PathParam::new("name", "a%20b")])
    );
    assert_eq!(req.inputs.as_deref(), Some(&br#"["a b"]"#[..]));
    assert_eq!(req.endpoint_expr_idx, 3);
    assert!(!req.require_auth);
}

#[tokio::test(flavor = "multi_thread")]
async fn integer_param_is_stringified_then_escaped() {
    let (rt, journal) = Recording::new();

    runtime::scope(rt, bounded(__encore_Items_Get(Context::new(), 42)))
        .await
        .expect("item");

    let req = journal.request();
    assert_eq!(req.path, "/items/42");
    assert_eq!(
        req.path_segments,
        Some(vec![runtime::PathParam::new("id", "42")])
    );

    let (rt, _) = Recording::new();
    let err = runtime::scope(rt, bounded(__encore_Items_Get(Context::new(), -1)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[tokio::test(flavor = "multi_thread")]
async fn business_error_is_round_tripped() {
    let (rt, journal) = Recording::new();

    let err = runtime::scope(rt, bounded(__encore_Hello_Greet(Context::new(), "nobody".into())))
        .await
        .unwrap_err();

    assert_eq!(err, Error::not_found("no such person"));
    assert_eq!(journal.finish_reqs(), 1);
    assert_eq!(journal.finishes(), 1);
    assert_eq!(
        journal.events()[2],
        Event::FinishReq {
            data: None,
            err: Some(ErrorCode::NotFound),
        }
    );
    assert_eq!(
        journal.events()[3],
        Event::Finish {
            err: Some(ErrorCode::NotFound)
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn panic_becomes_internal_error_without_hanging() {
    let (rt, journal) = Recording::new();

    let err = runtime::scope(rt, bounded(__encore_Hello_Greet(Context::new(), "boom".into())))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "panic handling request: boom");
    assert_eq!(journal.finish_reqs(), 1);
    assert_eq!(journal.finishes(), 1);
    assert_eq!(
        journal.events().last(),
        Some(&Event::Finish {
            err: Some(ErrorCode::Internal)
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn decode_failure_skips_handler() {
    let (rt, journal) = Recording::new();
    let backwards = app::Range { lo: 9, hi: 1 };

    let err = runtime::scope(rt, bounded(__encore_Ranges_Width(Context::new(), backwards)))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Internal);
    assert!(err.message.contains("9 > 1"), "{err}");
    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq {
                data: None,
                err: Some(ErrorCode::Internal),
            },
            Event::Finish {
                err: Some(ErrorCode::Internal)
            },
        ]
    );

    let (rt, _) = Recording::new();
    let width = runtime::scope(rt, __encore_Ranges_Width(Context::new(), app::Range { lo: 1, hi: 9 }))
        .await
        .expect("width");
    assert_eq!(width, 8);
}

#[tokio::test(flavor = "multi_thread")]
async fn unserializable_response_fails_the_same_way_for_trace_and_caller() {
    let (rt, journal) = Recording::new();

    let err = runtime::scope(rt, bounded(__encore_Vault_Peek(Context::new())))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Internal);
    assert!(err.message.starts_with("could not serialize response"), "{err}");
    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq {
                data: None,
                err: Some(ErrorCode::Internal),
            },
            Event::Finish {
                err: Some(ErrorCode::Internal)
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_params_still_begin_and_finish() {
    let (rt, journal) = Recording::new();

    runtime::scope(rt, bounded(__encore_Health_Ping(Context::new())))
        .await
        .expect("ping");

    let req = journal.request();
    assert_eq!(req.inputs, Some(Vec::new()));
    assert_eq!(req.path, "/");
    assert_eq!(req.path_segments, None);
    assert_eq!(journal.finish_reqs(), 1);
    assert_eq!(journal.finishes(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn begin_request_failure_skips_handler_and_finish_request() {
    let (rt, journal) = Recording::new();

    let err = runtime::scope(rt, bounded(__encore_Health_PingPrivate(Context::new())))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Unauthenticated);
    assert!(journal.request().require_auth);
    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::Finish {
                err: Some(ErrorCode::Unauthenticated)
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticated_caller_reaches_handler() {
    let (rt, journal) = Recording::new();
    let ctx = Context::new().with_auth(AuthInfo::new("u_1"));

    let uid = runtime::scope(rt, bounded(__encore_Auth_WhoAmI(ctx)))
        .await
        .expect("authenticated");

    assert_eq!(uid, "u_1");
    assert_eq!(journal.request().path, "/whoami");
    assert!(journal.request().require_auth);
    assert_eq!(journal.finishes(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn begin_call_failure_returns_immediately() {
    let (rt, journal) = Recording::refusing();

    let err = runtime::scope(rt, bounded(__encore_Hello_Greet(Context::new(), "x".into())))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Unavailable);
    assert_eq!(journal.events(), vec![Event::BeginCall]);
}

// -----------------------------------------------------------------------------
// Cancellation and nesting
// -----------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn dropped_wrapper_still_finishes_once() {
    let (rt, journal) = Recording::new();

    let outcome = runtime::scope(
        rt,
        tokio::time::timeout(Duration::from_millis(50), __encore_Slow_Wait(Context::new())),
    )
    .await;
    assert!(outcome.is_err(), "caller gave up before the handler finished");

    settled(&journal, 1).await;
    tokio::time::sleep(app::WAIT).await;

    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq { data: None, err: None },
            Event::Finish {
                err: Some(ErrorCode::Canceled)
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn nested_call_reports_to_the_scoped_runtime() {
    let (rt, journal) = Recording::new();

    runtime::scope(rt, bounded(__encore_Relay_Forward(Context::new())))
        .await
        .expect("forwarded");

    assert_eq!(journal.endpoints(), vec!["Forward", "Ping"]);
    assert_eq!(journal.finish_reqs(), 2);
    assert_eq!(journal.finishes(), 2);
    assert_eq!(
        journal.events(),
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq { data: None, err: None },
            Event::Finish { err: None },
            Event::FinishReq { data: None, err: None },
            Event::Finish { err: None },
        ]
    );
}

// -----------------------------------------------------------------------------
// Raw endpoints
// -----------------------------------------------------------------------------

async fn serve(path: &str) -> Vec<Event> {
    let (rt, journal) = Recording::new();
    let req = Request::new("GET", path);

    runtime::scope(
        rt,
        bounded(__encore_Files_Serve(Box::new(BufferedResponse::new()), req)),
    )
    .await;

    assert_eq!(journal.request().path, path);
    assert_eq!(journal.request().inputs, None);
    journal.events()
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_success_reports_captured_body() {
    let events = serve("/files/readme").await;

    assert_eq!(
        events[2],
        Event::FinishReq {
            data: Some(b"contents".to_vec()),
            err: None,
        }
    );
    assert_eq!(events[3], Event::Finish { err: None });
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_error_status_is_a_business_error() {
    let events = serve("/files/missing").await;

    assert_eq!(
        events[2],
        Event::FinishReq {
            data: None,
            err: Some(ErrorCode::Unknown),
        }
    );
    assert_eq!(
        events[3],
        Event::Finish {
            err: Some(ErrorCode::Unknown)
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_redirect_counts_as_success() {
    let events = serve("/files/moved").await;

    assert_eq!(events[2], Event::FinishReq { data: None, err: None });
    assert_eq!(events[3], Event::Finish { err: None });
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_panic_is_contained() {
    let events = serve("/files/crash").await;

    assert_eq!(
        events,
        vec![
            Event::BeginCall,
            Event::BeginReq,
            Event::FinishReq {
                data: None,
                err: Some(ErrorCode::Internal),
            },
            Event::Finish {
                err: Some(ErrorCode::Internal)
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_begin_call_failure_makes_no_other_calls() {
    let (rt, journal) = Recording::refusing();

    runtime::scope(
        rt,
        bounded(__encore_Files_Serve(
            Box::new(BufferedResponse::new()),
            Request::new("GET", "/files/readme"),
        )),
    )
    .await;

    assert_eq!(journal.events(), vec![Event::BeginCall]);
}

// -----------------------------------------------------------------------------
// Every path: finish_req / finish counts
// -----------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_call_counts_per_path() {
    // (case, refuse begin_call, name, expected finish_req, expected finish)
    let cases = [
        ("success", false, "ada", 1, 1),
        ("business error", false, "nobody", 1, 1),
        ("panic", false, "boom", 1, 1),
        ("begin call failure", true, "ada", 0, 0),
    ];

    for (case, refuse, name, finish_reqs, finishes) in cases {
        let (rt, journal) = if refuse {
            Recording::refusing()
        } else {
            Recording::new()
        };

        let _ = runtime::scope(rt, bounded(__encore_Hello_Greet(Context::new(), name.into()))).await;

        assert_eq!(journal.finish_reqs(), finish_reqs, "{case}");
        assert_eq!(journal.finishes(), finishes, "{case}");
    }
}
