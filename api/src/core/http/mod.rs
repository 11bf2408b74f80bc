pub mod hook_response;
