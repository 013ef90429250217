#[cfg(test)]
mod common;

#[cfg(test)]
mod auth_tests;

#[cfg(test)]
mod access_tests;



#[cfg(test)]
mod lifecycle_tests;


#[cfg(test)]
mod docs_tests;
