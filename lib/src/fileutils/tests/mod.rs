mod ln;
mod mv;
mod search;
