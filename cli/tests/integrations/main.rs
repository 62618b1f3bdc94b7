mod common;
mod convert;
mod list_show;
mod nutrition;
mod run;
mod server;
