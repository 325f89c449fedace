pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Wires the API surface under the `/api` scope. `/search` is registered
/// before `/{id}` so the literal segment wins.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(auth::login)).service(
        web::scope("/v1")
            .service(
                web::scope("/users")
                    .service(users::register)
                    .service(users::get_self)
                    .service(users::get_user_by_id)
                    .service(users::update_user)
                    .service(users::delete_user),
            )
            .service(
                web::scope("/tasks")
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::search_tasks)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            ),
    );
}
