use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web::Data, App, HttpServer};

use crate::{
    routes::{default_route, insights_route},
    services::{InsightsAgent, InsightsStore},
};

pub fn run(
    listener: TcpListener,
    agent: Data<InsightsAgent>,
    store: Data<InsightsStore>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(insights_route::generate_insights)
            .app_data(agent.clone())
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
