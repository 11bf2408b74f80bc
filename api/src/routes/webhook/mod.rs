pub mod webhook_route;
