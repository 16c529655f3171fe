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

use color_eyre::{eyre::eyre, Result};
use log::warn;

use ringbounce::BounceResolver;

use crate::cli_options::{Opt, Subcommands};

pub async fn cli_commands(opt: Opt) -> Result<()> {
    let config = opt.bounce_config();

    match opt.cmd.unwrap_or(Subcommands::Serve) {
        Subcommands::Serve => {
            let banner = format!("ringbounce {}", ringbounce::VERSION);
            eprintln!("{banner}");
            eprintln!("{}", "=".repeat(banner.len()));

            if config.whitelist.is_empty() {
                warn!("WEBRING_WHITELIST is empty so every bounce will be refused");
            }

            let resolver = BounceResolver::open(&config)?;
            if let Err(e) = crate::services::serve(resolver, opt.host, opt.port).await {
                println!("{e:?}");
                return Err(eyre!(e));
            }
        }
        Subcommands::List { json } => {
            crate::commands::cmd_cache::handle_list(&config, json)?;
        }
        Subcommands::Invalidate { ring } => {
            crate::commands::cmd_cache::handle_invalidate(&config, &ring)?;
        }
    }

    Ok(())
}
