//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any I/O (database calls, fetching signing keys) must be expressed as
//! futures so that the worker can serve other requests while it waits.
//!
//! ## Routes
//! | Method | Path                 | Permission          |
//! |--------|----------------------|---------------------|
//! | GET    | `/drinks`            |                     |
//! | GET    | `/drinks-detail`     | `get:drinks-detail` |
//! | POST   | `/drinks`            | `post:drinks`       |
//! | PATCH  | `/drinks/{drink_id}` | `patch:drinks`      |
//! | DELETE | `/drinks/{drink_id}` | `delete:drinks`     |
//! | GET    | `/health`            |                     |
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use drink_engine::{
    db_types::{Drink, NewDrink},
    traits::DrinkManagement,
    DrinkApi,
};
use log::*;

use crate::{
    auth::AuthClaims,
    data_objects::{DeleteResponse, DrinksResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires $permission:literal)  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::PermissionMiddlewareFactory::new($permission));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Fallbacks  ----------------------------------------------------
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    Err(ServerError::NoRecordFound(format!("No route for {} {}", req.method(), req.path())))
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    Err(ServerError::MethodNotAllowed(format!("{} {}", req.method(), req.path())))
}

/// Registers the drink routes against the backend `B`, plus the extractor error handlers that keep every failure in
/// the standard JSON envelope. The `DrinkApi<B>` and the `TokenVerifier` must be supplied as app data by the caller.
pub fn configure_drink_routes<B: DrinkManagement + 'static>(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let path_config =
        web::PathConfig::default().error_handler(|err, _req| ServerError::NoRecordFound(err.to_string()).into());
    cfg.app_data(json_config)
        .app_data(path_config)
        .service(DrinksRoute::<B>::new())
        .service(DrinksDetailRoute::<B>::new())
        .service(CreateDrinkRoute::<B>::new())
        .service(UpdateDrinkRoute::<B>::new())
        .service(DeleteDrinkRoute::<B>::new())
        // Anything that reaches these matched the path but not the method
        .service(web::resource("/drinks").to(method_not_allowed))
        .service(web::resource("/drinks-detail").to(method_not_allowed))
        .service(web::resource("/drinks/{drink_id}").to(method_not_allowed));
}

//----------------------------------------------   Drinks  ----------------------------------------------------
route!(drinks => Get "/drinks" impl DrinkManagement);
/// The public menu. Ingredient names are withheld.
pub async fn drinks<B: DrinkManagement>(api: web::Data<DrinkApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET drinks");
    let drinks = api.drinks().await?;
    if drinks.is_empty() {
        return Err(ServerError::NoRecordFound("The menu is empty".to_string()));
    }
    let drinks = drinks.iter().map(Drink::short).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(DrinksResponse::new(drinks)))
}

route!(drinks_detail => Get "/drinks-detail" impl DrinkManagement where requires "get:drinks-detail");
/// The full menu, including every ingredient.
pub async fn drinks_detail<B: DrinkManagement>(
    claims: AuthClaims,
    api: web::Data<DrinkApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET drinks-detail for {}", claims.subject());
    let drinks = api.drinks().await?;
    if drinks.is_empty() {
        return Err(ServerError::NoRecordFound("The menu is empty".to_string()));
    }
    let drinks = drinks.iter().map(Drink::long).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(DrinksResponse::new(drinks)))
}

route!(create_drink => Post "/drinks" impl DrinkManagement where requires "post:drinks");
pub async fn create_drink<B: DrinkManagement>(
    claims: AuthClaims,
    body: web::Json<NewDrink>,
    api: web::Data<DrinkApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let drink = body.into_inner();
    debug!("💻️ POST drinks: {} is adding '{}'", claims.subject(), drink.title);
    let drink = api.create_drink(drink).await?;
    Ok(HttpResponse::Ok().json(DrinksResponse::new(vec![drink.long()])))
}

route!(update_drink => Patch "/drinks/{drink_id}" impl DrinkManagement where requires "patch:drinks");
/// Replaces the title and recipe of an existing drink.
pub async fn update_drink<B: DrinkManagement>(
    claims: AuthClaims,
    path: web::Path<i64>,
    body: web::Json<NewDrink>,
    api: web::Data<DrinkApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PATCH drinks/{id} by {}", claims.subject());
    let drink = api
        .update_drink(id, body.into_inner())
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Drink #{id} does not exist")))?;
    Ok(HttpResponse::Ok().json(DrinksResponse::new(vec![drink.long()])))
}

route!(delete_drink => Delete "/drinks/{drink_id}" impl DrinkManagement where requires "delete:drinks");
pub async fn delete_drink<B: DrinkManagement>(
    claims: AuthClaims,
    path: web::Path<i64>,
    api: web::Data<DrinkApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE drinks/{id} by {}", claims.subject());
    let id = api
        .delete_drink(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Drink #{id} does not exist")))?;
    Ok(HttpResponse::Ok().json(DeleteResponse::new(id)))
}
