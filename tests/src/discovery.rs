mod agent_http;
mod integration;
