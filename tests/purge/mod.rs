mod cli_surface;
mod convergence;
