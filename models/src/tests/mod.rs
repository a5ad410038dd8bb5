mod bind_target;
mod conversation;
