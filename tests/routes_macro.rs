use cinder_router::{routes, Dispatch, HandlerRef, Method, RouteCollector, RouterConfig, RouterError};

fn service(id: &str) -> HandlerRef<()> {
    HandlerRef::service(id)
}

#[test]
fn routes_macro() {
    let register = routes! {
        GET "/u/{uid}/p/{pid:int}" => service("1"),
        POST "/u/{uid}/p" => service("2"),
        @ "/v1" => routes! {
            GET "/info" => service("3"),
            POST "/info" => service("4"),
            @ "/u/{uid}" => routes! {
                GET "p/{pid:int}" => service("6"),
                POST "p" => service("7"),
            }
        },
        ANY "/files/{path:any}" => service("5"),
    };

    let mut collector = RouteCollector::new(&RouterConfig::default()).unwrap();
    register(&mut collector).unwrap();
    let (table, _) = collector.compile().unwrap();

    let cases = [
        (Method::GET, "/u/asd/p/12", "1"),
        (Method::POST, "/u/asd/p", "2"),
        (Method::GET, "/v1/info", "3"),
        (Method::POST, "/v1/info", "4"),
        (Method::HEAD, "/files/home/asd", "5"),
        (Method::GET, "/v1/u/asd/p/34", "6"),
        (Method::POST, "/v1/u/asd/p", "7"),
    ];
    for (method, path, expected) in cases {
        match table.dispatch(&method, path) {
            Dispatch::Found { route, .. } => assert_eq!(route.handler(), &service(expected)),
            _ => panic!("{} {} did not match", method, path),
        }
    }
}

#[test]
fn routes_macro_propagates_errors() {
    let register = routes! {
        GET "/dup" => service("a"),
        GET "/dup/" => service("b"),
    };

    let mut collector = RouteCollector::new(&RouterConfig::default()).unwrap();
    assert!(matches!(
        register(&mut collector),
        Err(RouterError::DuplicateRoute { .. })
    ));
}
