use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create categorie table
        manager
            .create_table(
                Table::create()
                    .table(Categorie::Table)
                    .if_not_exists()
                    .col(pk_auto(Categorie::IdCategorie))
                    .col(string(Categorie::Nom).unique_key())
                    .col(string(Categorie::Couleur))
                    .to_owned(),
            )
            .await?;

        // Create abonnement table. The unique key on nom_abonnement is the
        // source of truth for duplicate names; application-level checks are
        // pre-flight only.
        manager
            .create_table(
                Table::create()
                    .table(Abonnement::Table)
                    .if_not_exists()
                    .col(pk_auto(Abonnement::IdAbonnement))
                    .col(string(Abonnement::NomAbonnement).unique_key())
                    .col(string(Abonnement::NomFournisseur))
                    .col(decimal_len(Abonnement::Montant, 16, 4))
                    .col(string_len(Abonnement::FrequencePrelevement, 5))
                    .col(date(Abonnement::DateEcheance))
                    .col(date_null(Abonnement::DateFinEngagement))
                    // Nullable for pre-existing rows; NULL reads as false.
                    .col(boolean_null(Abonnement::IsEngagement))
                    .col(integer(Abonnement::IdCategorie))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_abonnement_categorie")
                            .from(Abonnement::Table, Abonnement::IdCategorie)
                            .to(Categorie::Table, Categorie::IdCategorie)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create utilisateur table
        manager
            .create_table(
                Table::create()
                    .table(Utilisateur::Table)
                    .if_not_exists()
                    .col(pk_auto(Utilisateur::IdUtilisateur))
                    .col(string(Utilisateur::Mail).unique_key())
                    .col(string(Utilisateur::Motdepasse))
                    .col(string_null(Utilisateur::Nom))
                    .col(string_null(Utilisateur::Prenom))
                    .col(string_null(Utilisateur::Telephone))
                    .col(decimal_len_null(Utilisateur::Salaire, 16, 4))
                    .col(boolean(Utilisateur::Ismailverif).default(false))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Utilisateur::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Abonnement::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categorie::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categorie {
    Table,
    IdCategorie,
    Nom,
    Couleur,
}

#[derive(DeriveIden)]
enum Abonnement {
    Table,
    IdAbonnement,
    NomAbonnement,
    NomFournisseur,
    Montant,
    FrequencePrelevement,
    DateEcheance,
    DateFinEngagement,
    IsEngagement,
    IdCategorie,
}

#[derive(DeriveIden)]
enum Utilisateur {
    Table,
    IdUtilisateur,
    Mail,
    Motdepasse,
    Nom,
    Prenom,
    Telephone,
    Salaire,
    Ismailverif,
}
