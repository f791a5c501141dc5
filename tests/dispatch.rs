//! End-to-end dispatch behavior through the public router API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use axum::response::Response;
use switchyard::http::{send_text, Context};
use switchyard::{create_error, dispatch, BoxFuture, Error, Result, Router};

mod common;

use common::{body_text, request};

fn hello<'a>(ctx: &'a mut Context<()>) -> BoxFuture<'a, Result<Response>> {
    Box::pin(async move { Ok(send_text(ctx, "Hello, World!", StatusCode::OK)) })
}

#[tokio::test]
async fn test_routes_and_handled_errors() {
    let app = Router::<()>::new()
        .get("/hello", hello)
        .post("/error", |_ctx| {
            Box::pin(async move {
                Err(create_error("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR))
            })
        });

    let response = dispatch(&app, request(Method::GET, "https://example.com/hello"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello, World!");

    let response = dispatch(&app, request(Method::POST, "https://example.com/error"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_parameters_reach_handler() {
    let app = Router::<()>::new().get("/users/:id", |ctx| {
        Box::pin(async move {
            let id = ctx.param("id").unwrap_or_default().to_string();
            Ok(send_text(ctx, id, StatusCode::OK))
        })
    });

    let response = app
        .handle(request(Method::GET, "http://example.com/users/42"), ())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "42");
}

#[tokio::test]
async fn test_handled_failure_status_and_body() {
    let app = Router::<()>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.set_header("X-Trace", "t-1")?;
                Ok(None)
            })
        })
        .get("/thing", |_ctx| {
            Box::pin(async move { Err(create_error("nope", StatusCode::NOT_FOUND)) })
        });

    let response = app
        .handle(request(Method::GET, "http://example.com/thing"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-trace"], "t-1");
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(body_text(response).await, "nope");
}

#[tokio::test]
async fn test_handled_failure_after_continuation() {
    let app = Router::<()>::new()
        .wrap(|ctx, next| {
            Box::pin(async move {
                ctx.set_header("X-Pre", "1")?;
                let _ = next.run(ctx).await?;
                Err(create_error("post-fail", StatusCode::CONFLICT))
            })
        })
        .get("/", hello);

    let response = app
        .handle(request(Method::GET, "http://example.com/"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.headers()["x-pre"], "1");
    assert_eq!(body_text(response).await, "post-fail");
}

#[tokio::test]
async fn test_handled_failure_before_continuation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let app = Router::<()>::new()
        .wrap(|ctx, next| {
            Box::pin(async move {
                ctx.set_header("X-Pre", "1")?;
                if ctx.request_header("authorization").is_none() {
                    return Err(create_error("unauthorized", StatusCode::UNAUTHORIZED));
                }
                next.run(ctx).await
            })
        })
        .get("/", move |ctx| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(send_text(ctx, "home", StatusCode::OK)) })
        });

    let response = app
        .handle(request(Method::GET, "http://example.com/"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-pre"], "1");
    assert_eq!(body_text(response).await, "unauthorized");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_short_circuit_skips_route_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let app = Router::<()>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.set_header("X-Blocked", "yes")?;
                Ok(Some(send_text(ctx, "maintenance", StatusCode::SERVICE_UNAVAILABLE)))
            })
        })
        .get("/", move |ctx| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(send_text(ctx, "home", StatusCode::OK)) })
        });

    for path in ["/", "/anything"] {
        let uri = format!("http://example.com{path}");
        let response = app.handle(request(Method::GET, &uri), ()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["x-blocked"], "yes");
        assert_eq!(body_text(response).await, "maintenance");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_runs_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let first = log.clone();
    let second = log.clone();
    let third = log.clone();
    let app = Router::<()>::new()
        .before(move |_ctx| {
            first.lock().unwrap().push("first");
            Box::pin(async move { Ok(None) })
        })
        .wrap(move |ctx, next| {
            let log = second.clone();
            Box::pin(async move {
                log.lock().unwrap().push("wrap-in");
                let response = next.run(ctx).await;
                log.lock().unwrap().push("wrap-out");
                response
            })
        })
        .get("/", move |ctx| {
            third.lock().unwrap().push("handler");
            Box::pin(async move { Ok(send_text(ctx, "ok", StatusCode::OK)) })
        });

    app.handle(request(Method::GET, "http://example.com/"), ())
        .await
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first", "wrap-in", "handler", "wrap-out"]
    );
}

#[tokio::test]
async fn test_middleware_post_processes_response() {
    let app = Router::<()>::new()
        .wrap(|ctx, next| {
            Box::pin(async move {
                let mut response = next.run(ctx).await?;
                response
                    .headers_mut()
                    .insert("x-wrapped", "1".parse().unwrap());
                Ok(response)
            })
        })
        .get("/hello", hello);

    let response = app
        .handle(request(Method::GET, "http://example.com/hello"), ())
        .await
        .unwrap();
    assert_eq!(response.headers()["x-wrapped"], "1");
}

#[tokio::test]
async fn test_middleware_can_recover_from_failure() {
    let app = Router::<()>::new()
        .wrap(|ctx, next| {
            Box::pin(async move {
                let result = next.run(ctx).await;
                match result {
                    Err(Error::Unhandled(_)) => {
                        Ok(send_text(ctx, "Bad Request", StatusCode::BAD_REQUEST))
                    }
                    other => other,
                }
            })
        })
        .get("/broken", |_ctx| {
            Box::pin(async move { Err(Error::unhandled("parse failure")) })
        });

    let response = app
        .handle(request(Method::GET, "http://example.com/broken"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unhandled_failure_reaches_caller() {
    let app = Router::<()>::new().get("/broken", |_ctx| {
        Box::pin(async move { Err(Error::unhandled("parse failure")) })
    });

    let err = app
        .handle(request(Method::GET, "http://example.com/broken"), ())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unhandled(_)));
}

#[tokio::test]
async fn test_not_found_is_deterministic() {
    let app = Router::<()>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.add_header("Vary", "Origin")?;
                Ok(None)
            })
        })
        .get("/users/:id/posts", |ctx| {
            Box::pin(async move { Ok(send_text(ctx, "posts", StatusCode::OK)) })
        });

    for uri in [
        "http://example.com/nothing/here",
        "http://example.com/users/7",
        "http://example.com/users/7/posts/extra",
    ] {
        let response = app.handle(request(Method::GET, uri), ()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["vary"], "Origin");
        assert_eq!(body_text(response).await, "Not Found");
    }

    let response = app
        .handle(request(Method::DELETE, "http://example.com/users/7/posts"), ())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mount_overrides_and_appends_chain() {
    let host = Router::<()>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.add_header("X-Chain", "host")?;
                Ok(None)
            })
        })
        .get("/a", |ctx| Box::pin(async move { Ok(send_text(ctx, "H1", StatusCode::OK)) }));

    let child = Router::<()>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.add_header("X-Chain", "child")?;
                Ok(None)
            })
        })
        .get("/b", |ctx| Box::pin(async move { Ok(send_text(ctx, "H2", StatusCode::OK)) }))
        .get("/a", |ctx| Box::pin(async move { Ok(send_text(ctx, "H3", StatusCode::OK)) }));

    let app = host.mount(child);

    let response = app
        .handle(request(Method::GET, "http://example.com/a"), ())
        .await
        .unwrap();
    let chain: Vec<_> = response
        .headers()
        .get_all("x-chain")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(chain, vec!["host", "child"]);
    assert_eq!(body_text(response).await, "H3");

    let response = app
        .handle(request(Method::GET, "http://example.com/b"), ())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "H2");
}

#[derive(Clone, Default)]
struct Session {
    user: Option<String>,
    hits: usize,
}

#[tokio::test]
async fn test_extension_state_flows_through_chain() {
    let app = Router::<Session>::new()
        .before(|ctx| {
            Box::pin(async move {
                ctx.hits += 1;
                if ctx.request_header("x-user").is_some() {
                    ctx.user = ctx.request_header("x-user").map(str::to_string);
                }
                Ok(None)
            })
        })
        .get("/me", |ctx| {
            Box::pin(async move {
                let body = format!("{}:{}", ctx.user.as_deref().unwrap_or("anonymous"), ctx.hits);
                Ok(send_text(ctx, body, StatusCode::OK))
            })
        });

    let mut req = request(Method::GET, "http://example.com/me");
    req.headers_mut().insert("x-user", "alice".parse().unwrap());
    let initial = Session {
        user: None,
        hits: 10,
    };
    let response = app.handle(req, initial).await.unwrap();
    assert_eq!(body_text(response).await, "alice:11");

    let response = app
        .handle(request(Method::GET, "http://example.com/me"), Session::default())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "anonymous:1");
}

#[tokio::test]
async fn test_concurrent_dispatch_shares_router() {
    let app: Arc<Router<usize>> = Arc::new(Router::<usize>::new().get("/n/:value", |ctx| {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let body = format!("{}-{}", ctx.param("value").unwrap_or_default(), *ctx.ext());
            Ok(send_text(ctx, body, StatusCode::OK))
        })
    }));

    let mut tasks = Vec::new();
    for i in 0..32usize {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let uri = format!("http://example.com/n/{i}");
            let response = app.handle(request(Method::GET, &uri), i).await.unwrap();
            body_text(response).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), format!("{i}-{i}"));
    }
}
