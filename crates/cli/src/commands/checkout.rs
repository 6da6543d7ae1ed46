//! Checkout command.

use redseam_storefront::{CheckoutError, OrderDetails, StorefrontApp};

/// Submit the cart as an order.
///
/// The contact email defaults to the logged-in account's email, fetched
/// from the profile endpoint, mirroring the checkout form prefill.
#[allow(clippy::print_stdout)]
pub async fn submit(
    app: &StorefrontApp,
    name: String,
    surname: String,
    email: Option<String>,
    zip_code: String,
    address: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = match email {
        Some(email) => email,
        None => prefill_email(app).await.unwrap_or_default(),
    };

    let order = OrderDetails {
        name,
        surname,
        email,
        zip_code,
        address,
    };

    match app.engine().checkout(&order).await {
        Ok(receipt) => {
            println!("{}", receipt.message);
            Ok(())
        }
        Err(CheckoutError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                println!("  {field}: {message}");
            }
            Err("order details failed validation".into())
        }
        Err(CheckoutError::AuthExpired) => {
            app.tracker().handle_auth_expired();
            println!("your session has expired, please log in again");
            Err("checkout requires authentication".into())
        }
        Err(CheckoutError::RequiresAuthentication) => {
            println!("please log in to check out");
            Err("checkout requires authentication".into())
        }
        Err(e) => Err(e.into()),
    }
}

/// The logged-in account's email, if available.
async fn prefill_email(app: &StorefrontApp) -> Option<String> {
    let token = app.session().token()?;
    match app.api().current_user(&token).await {
        Ok(profile) => Some(profile.email),
        Err(e) => {
            tracing::warn!(error = %e, "could not prefill email from profile");
            None
        }
    }
}
