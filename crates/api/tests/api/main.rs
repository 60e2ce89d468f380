mod helpers;
mod observation_routes;
