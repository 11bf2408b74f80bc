pub mod invoke_route;
