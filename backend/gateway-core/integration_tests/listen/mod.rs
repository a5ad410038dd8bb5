mod helpers;
mod holder;
mod retry;
