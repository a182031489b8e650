/// Builds a registration closure for [`RouteCollector`](crate::RouteCollector).
///
/// ```ignore
/// let routes = routes! {
///     GET "/users/{id:int}" => HandlerRef::action("Users", "show"),
///     @ "/admin" => routes! {
///         DELETE "/users/{id:int}" => HandlerRef::action("Users", "destroy")
///     }
/// };
/// ```
#[macro_export]
macro_rules! routes {
    {@entry $r:expr, @, $prefix:expr, $group:expr} => {
        $r.group($prefix, $group)?
    };
    {@entry $r:expr, ANY, $pattern:expr, $handler:expr} => {
        $r.any($pattern, $handler)?
    };
    {@entry $r:expr, GET, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::GET], $pattern, $handler)?
    };
    {@entry $r:expr, POST, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::POST], $pattern, $handler)?
    };
    {@entry $r:expr, PUT, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::PUT], $pattern, $handler)?
    };
    {@entry $r:expr, PATCH, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::PATCH], $pattern, $handler)?
    };
    {@entry $r:expr, DELETE, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::DELETE], $pattern, $handler)?
    };
    {@entry $r:expr, HEAD, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::HEAD], $pattern, $handler)?
    };
    {@entry $r:expr, OPTIONS, $pattern:expr, $handler:expr} => {
        $r.route(&[$crate::Method::OPTIONS], $pattern, $handler)?
    };

    {$($method:tt $pattern:expr => $handler:expr),+ $(,)?} => {
        |__r: &mut $crate::RouteCollector<_>| -> ::std::result::Result<(), $crate::RouterError> {
            $($crate::routes!(@entry __r, $method, $pattern, $handler);)+
            Ok(())
        }
    };
}
