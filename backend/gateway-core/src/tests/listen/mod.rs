mod holder;
mod retry;
