/*
 Copyright (c) 2025 Mark Hughes

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as published by
 the Free Software Foundation, either version 3 of the License, or
 (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub(crate) mod bounce;
pub(crate) mod helpers;

use std::io;
use std::time::Duration;

use actix_web::{dev::Service, middleware::Logger, web, web::Data, App, HttpServer};
use log::{debug, info};

use ringbounce::web::RingFetch;
use ringbounce::BounceResolver;

pub const CONNECTION_TIMEOUT: u64 = 75;

/// Run the bounce server until it is killed.
///
/// The resolver is shared by every worker, so all workers see one cache and
/// concurrent requests for the same ring share one fetch.
pub async fn serve<F: RingFetch + 'static>(
    resolver: BounceResolver<F>,
    host: String,
    port: u16,
) -> io::Result<()> {
    let resolver = Data::new(resolver);

    let server = HttpServer::new(move || {
        App::new()
            // Macro logging using env_logger for actix and ringbounce
            .wrap(Logger::default())
            .wrap_fn(|req, srv| {
                debug!("HttpRequest : {} {}", req.head().method, req.path());
                let fut = srv.call(req);
                async {
                    let res = fut.await?;
                    debug!("HttpResponse: {}", res.status());
                    Ok(res)
                }
            })
            .app_data(resolver.clone())
            .configure(configure::<F>)
    })
    .keep_alive(Duration::from_secs(CONNECTION_TIMEOUT));

    info!("ringbounce listening on {host} port {port}");
    eprintln!("Listening on {host} port {port}.");
    server.bind((host, port))?.run().await
}

/// Routes served by ringbounce. Anything else is 404 Not Found.
pub fn configure<F: RingFetch + 'static>(config: &mut web::ServiceConfig) {
    config
        .route("/random", web::get().to(bounce::bounce_random::<F>))
        .route("/next", web::get().to(bounce::bounce_next::<F>))
        .route("/prev", web::get().to(bounce::bounce_prev::<F>))
        .default_service(web::to(helpers::not_found));
}
