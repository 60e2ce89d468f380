use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

/// Route and a short description of what it returns.
const ROUTES: &[(&str, &str)] = &[
    ("/api/v1.0/precipitation", "Precipitation by date for the last year of data"),
    ("/api/v1.0/stations", "Identifiers of all weather stations"),
    (
        "/api/v1.0/tobs",
        "Temperature observations of the most active station for the last year of data",
    ),
    (
        "/api/v1.0/temperature/<start>",
        "Min, average and max temperature from start (yyyy-mm-dd) onwards",
    ),
    (
        "/api/v1.0/temperature/<start>/<end>",
        "Min, average and max temperature between start and end (yyyy-mm-dd), inclusive",
    ),
];

pub fn home_page() -> Markup {
    let config = PageConfig {
        title: "Climate Analysis API",
    };

    base(&config, content())
}

fn content() -> Markup {
    html! {
        p class="subtitle" { "Welcome to the Climate Analysis API!" }
        h2 class="title is-5" { "Available Routes:" }
        table class="table is-fullwidth is-striped" {
            tbody {
                @for (path, description) in ROUTES {
                    tr {
                        td { code { (path) } }
                        td { (description) }
                    }
                }
            }
        }
    }
}
