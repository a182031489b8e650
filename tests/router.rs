use cinder_router::router::{cast_params, CastKind};
use cinder_router::{
    Dispatch, HandlerRef, Method, ParamValue, RouteCollector, RouteTable, RouterConfig, RouterError,
};

fn compile(f: impl FnOnce(&mut RouteCollector<()>) -> Result<(), RouterError>) -> RouteTable<()> {
    let mut r = RouteCollector::new(&RouterConfig::default()).unwrap();
    f(&mut r).unwrap();
    r.compile().unwrap().0
}

fn handler_of<'a>(d: &'a Dispatch<'_, '_, ()>) -> Option<&'a HandlerRef<()>> {
    match d {
        Dispatch::Found { route, .. } => Some(route.handler()),
        _ => None,
    }
}

#[test]
fn router_common() {
    let table = compile(|r| {
        r.group("/user/{user_id}", |user| {
            user.get("/post/{post_id:int}", HandlerRef::service("post"))?;
            user.get("/profile", HandlerRef::service("profile"))?;
            user.get("/file/{path:any}", HandlerRef::service("file"))?;
            user.get("", HandlerRef::service("user"))?;
            Ok(())
        })?;
        r.get("/explore", HandlerRef::service("explore"))?;
        r.get("/pan/{name}.php", HandlerRef::service("php"))?;
        Ok(())
    });

    let cases: &[(&str, &str, &[(&str, ParamValue)])] = &[
        (
            "/user/asd/post/123",
            "post",
            &[
                ("user_id", ParamValue::Str(String::new())),
                ("post_id", ParamValue::Int(123)),
            ],
        ),
        ("/user/asd/profile", "profile", &[]),
        (
            "/user/asd/file/home/asd/.bashrc",
            "file",
            &[("path", ParamValue::Str(String::new()))],
        ),
        ("/user/asd/", "user", &[]),
        ("/explore", "explore", &[]),
        ("/pan/phpinfo.php", "php", &[]),
    ];

    for &(url, service, expected) in cases {
        let d = table.dispatch(&Method::GET, url.trim_end_matches('/'));
        assert_eq!(handler_of(&d), Some(&HandlerRef::service(service)), "{}", url);

        if let Dispatch::Found { captures, casts, .. } = d {
            let params = cast_params(&captures, casts).unwrap();
            for (name, value) in expected {
                match value {
                    ParamValue::Str(_) => assert!(params.str(name).is_some()),
                    other => assert_eq!(params.get(name), Some(other)),
                }
            }
        }
    }

    match table.dispatch(&Method::GET, "/user/asd/file/home/asd/.bashrc") {
        Dispatch::Found { captures, .. } => {
            assert_eq!(captures.get("user_id"), Some("asd"));
            assert_eq!(captures.get("path"), Some("home/asd/.bashrc"));
        }
        _ => panic!("expected a match"),
    };
}

#[test]
fn router_collision() {
    let mut r: RouteCollector<()> = RouteCollector::new(&RouterConfig::default()).unwrap();
    assert!(r.get("/u/{id}/p", HandlerRef::service("a")).is_ok());
    assert!(matches!(
        r.get("/u/{id}/p", HandlerRef::service("b")).map(|_| ()),
        Err(RouterError::DuplicateRoute { .. })
    ));
    assert!(r.post("/u/{id}/p", HandlerRef::service("c")).is_ok());
    assert!(r.get("/u/{uid}/p", HandlerRef::service("d")).is_ok());

    assert!(matches!(
        r.get("/u/{id}/p/{id}", HandlerRef::service("e")).map(|_| ()),
        Err(RouterError::InvalidPattern { .. })
    ));
    assert!(matches!(
        r.get("/u/{id:number}", HandlerRef::service("f")).map(|_| ()),
        Err(RouterError::InvalidPattern { .. })
    ));
}

#[test]
fn router_registration_order_wins() {
    let table = compile(|r| {
        r.get("/hello/{name}", HandlerRef::service("A"))?;
        r.get("/hello/{id:int}", HandlerRef::service("B"))?;
        r.get("/hello/world", HandlerRef::service("static"))?;
        Ok(())
    });

    let d = table.dispatch(&Method::GET, "/hello/42");
    assert_eq!(handler_of(&d), Some(&HandlerRef::service("A")));
    let d = table.dispatch(&Method::GET, "/hello/world");
    assert_eq!(handler_of(&d), Some(&HandlerRef::service("static")));
    assert!(matches!(
        table.dispatch(&Method::GET, "/hello/world/asd"),
        Dispatch::NotFound
    ));
    assert!(matches!(table.dispatch(&Method::GET, "/hello"), Dispatch::NotFound));
}

#[test]
fn router_method_not_allowed() {
    let table = compile(|r| {
        r.get("/x", HandlerRef::service("get"))?;
        r.post("/x", HandlerRef::service("post"))?;
        r.any("/ping", HandlerRef::service("ping"))?;
        Ok(())
    });

    match table.dispatch(&Method::DELETE, "/x") {
        Dispatch::MethodNotAllowed(allowed) => assert_eq!(allowed, [Method::GET, Method::POST]),
        _ => panic!("expected 405"),
    }
    for method in [Method::GET, Method::DELETE, Method::OPTIONS] {
        assert!(table.dispatch(&method, "/ping").is_found());
    }
    match table.dispatch(&Method::TRACE, "/ping") {
        Dispatch::MethodNotAllowed(allowed) => assert_eq!(allowed.len(), 7),
        _ => panic!("expected 405"),
    };
}

#[test]
fn router_typed_parameters() {
    let table = compile(|r| {
        r.get("/users/{id:int}", HandlerRef::action("Users", "show"))?;
        r.get("/items/{price:float}/{fresh:bool}", HandlerRef::action("Items", "find"))?;
        r.get("/tokens/{id:uuid}", HandlerRef::action("Tokens", "show"))?;
        Ok(())
    });

    let params = |path: &str| match table.dispatch(&Method::GET, path) {
        Dispatch::Found { captures, casts, .. } => Some(cast_params(&captures, casts)),
        _ => None,
    };

    let ok = params("/users/42").unwrap().unwrap();
    assert_eq!(ok.int("id"), Some(42));
    let ok = params("/users/-7").unwrap().unwrap();
    assert_eq!(ok.int("id"), Some(-7));
    assert!(params("/users/abc").is_none());
    assert!(params("/users/1e3").is_none());
    for bad in ["/users/007", "/users/-0", "/users/99999999999999999999"] {
        assert!(matches!(
            params(bad),
            Some(Err(RouterError::InvalidParameter { ref name, .. })) if name == "id"
        ));
    }

    let ok = params("/items/2.50/FALSE").unwrap().unwrap();
    assert_eq!(ok.float("price"), Some(2.5));
    assert_eq!(ok.boolean("fresh"), Some(false));
    assert!(params("/items/5./true").is_none());
    assert!(params("/items/5/maybe").is_none());

    let uuid = "123e4567-e89b-12d3-a456-426614174000";
    let ok = params(&format!("/tokens/{}", uuid)).unwrap().unwrap();
    assert_eq!(ok.str("id"), Some(uuid));
    assert!(params("/tokens/not-a-uuid").is_none());
}

#[test]
fn cast_kinds_round_trip() {
    use cinder_router::router::cast;

    for n in [0_i64, 1, -1, 42, i64::MAX, i64::MIN] {
        assert_eq!(cast("n", &n.to_string(), CastKind::Int).unwrap(), ParamValue::Int(n));
    }
    for s in ["0.5", "-3.25", "10"] {
        let expected: f64 = s.parse().unwrap();
        assert_eq!(cast("x", s, CastKind::Float).unwrap(), ParamValue::Float(expected));
    }
    assert_eq!(cast("b", "1", CastKind::Bool).unwrap(), ParamValue::Bool(true));
    assert_eq!(cast("b", "False", CastKind::Bool).unwrap(), ParamValue::Bool(false));
    assert!(cast("b", "yes", CastKind::Bool).is_err());
}
