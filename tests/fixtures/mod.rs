//! Request payloads shared by the integration tests.

use serde_json::{json, Value};

pub fn valid_contact() -> Value {
    json!({
        "name": "Jean Dupont",
        "email": "jean@example.com",
        "message": "Bonjour, je voudrais un devis pour ma salle."
    })
}

pub fn invalid_contact() -> Value {
    json!({
        "name": "A",
        "email": "bad",
        "message": "short"
    })
}

pub fn full_contact() -> Value {
    json!({
        "name": "Lucie Bernard",
        "email": "lucie@crossfit-lyon.fr",
        "phone": "0478000000",
        "gymName": "CrossFit Lyon",
        "city": "Lyon",
        "activity": "CrossFit",
        "message": "Bonjour,\nnous cherchons un produit <désinfectant> pour nos tapis."
    })
}

pub fn valid_quote() -> Value {
    json!({
        "name": "Marie Martin",
        "email": "marie@example.com",
        "phone": "0612345678",
        "gymName": "Dojo Paris",
        "postalCode": "75001",
        "city": "Paris"
    })
}

pub fn full_quote() -> Value {
    json!({
        "name": "Marie Martin",
        "email": "marie@example.com",
        "phone": "0612345678",
        "gymName": "Dojo Paris",
        "postalCode": "75001",
        "city": "Paris",
        "activities": "Judo, Jiu-jitsu",
        "surfaces": "Tatamis",
        "surfaceArea": "250",
        "frequency": "Quotidienne",
        "message": "Livraison mensuelle souhaitée."
    })
}
