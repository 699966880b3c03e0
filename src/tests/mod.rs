mod helpers;
mod routing;
