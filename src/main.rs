mod accounts;
mod amounts;
mod budget;
mod cli;
mod clock;
mod errors;
mod frequency;
mod net_worth;
mod period;
mod recurring;
mod scheduler;
mod vault;

use crate::cli::run;
fn main() {
    run()
}
